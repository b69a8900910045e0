//! In-circuit replay of the values a circuit input must satisfy.
//!
//! The ownership circuit recomputes the hashed private key and the nullifier
//! from its private inputs and range-checks every limb. [`enforce_witness`]
//! builds those same constraints, so a mismatch between the native pipeline
//! and the circuit surfaces before an input artifact is produced.

use ark_bn254::Fr;
use ark_r1cs_std::alloc::AllocVar;
use ark_r1cs_std::eq::EqGadget;
use ark_r1cs_std::fields::fp::FpVar;
use ark_relations::r1cs::{ConstraintSystem, ConstraintSystemRef, SynthesisError};

use crate::error::PrimitiveError;
use crate::limbs::{self, Limbs, LIMB_COUNT};
use crate::poseidon::{poseidon_hash_var, PoseidonHasher};
use crate::range_check::enforce_limb_width;

/// Field-level view of a circuit input.
#[derive(Clone, Debug)]
pub struct InputWitness {
    pub private_key: [Fr; LIMB_COUNT],
    pub r: [Fr; LIMB_COUNT],
    pub s: [Fr; LIMB_COUNT],
    pub message_hash: [Fr; LIMB_COUNT],
    pub asset_id: Fr,
    pub counter: Fr,
    pub private_key_hashed: Fr,
    pub nullifier: Fr,
}

impl InputWitness {
    /// Build from native limbs and derived values.
    #[allow(clippy::too_many_arguments)]
    pub fn from_limbs(
        private_key: &Limbs,
        r: &Limbs,
        s: &Limbs,
        message_hash: &Limbs,
        asset_id: Fr,
        counter: u64,
        private_key_hashed: Fr,
        nullifier: Fr,
    ) -> Self {
        Self {
            private_key: limbs::to_fields(private_key),
            r: limbs::to_fields(r),
            s: limbs::to_fields(s),
            message_hash: limbs::to_fields(message_hash),
            asset_id,
            counter: Fr::from(counter),
            private_key_hashed,
            nullifier,
        }
    }
}

fn alloc_limbs(
    cs: &ConstraintSystemRef<Fr>,
    values: &[Fr; LIMB_COUNT],
) -> Result<Vec<FpVar<Fr>>, SynthesisError> {
    values
        .iter()
        .map(|v| {
            let var = FpVar::new_witness(cs.clone(), || Ok(*v))?;
            enforce_limb_width(&var)?;
            Ok(var)
        })
        .collect()
}

/// Generate the consistency constraints for `witness`.
pub fn enforce_witness(
    cs: ConstraintSystemRef<Fr>,
    hasher: &PoseidonHasher,
    witness: &InputWitness,
) -> Result<(), SynthesisError> {
    let private_key = alloc_limbs(&cs, &witness.private_key)?;
    alloc_limbs(&cs, &witness.r)?;
    alloc_limbs(&cs, &witness.s)?;
    alloc_limbs(&cs, &witness.message_hash)?;

    let asset_id = FpVar::new_input(cs.clone(), || Ok(witness.asset_id))?;
    let counter = FpVar::new_input(cs.clone(), || Ok(witness.counter))?;
    let nullifier = FpVar::new_input(cs.clone(), || Ok(witness.nullifier))?;
    let private_key_hashed = FpVar::new_witness(cs.clone(), || Ok(witness.private_key_hashed))?;

    let computed_hashed = poseidon_hash_var(cs.clone(), hasher.config(), &private_key)?;
    computed_hashed.enforce_equal(&private_key_hashed)?;

    let computed_nullifier = poseidon_hash_var(
        cs,
        hasher.config(),
        &[asset_id, private_key_hashed, counter],
    )?;
    computed_nullifier.enforce_equal(&nullifier)?;

    Ok(())
}

/// Run the consistency constraints in a fresh constraint system.
pub fn check_witness(hasher: &PoseidonHasher, witness: &InputWitness) -> Result<(), PrimitiveError> {
    let cs = ConstraintSystem::<Fr>::new_ref();
    enforce_witness(cs.clone(), hasher, witness)
        .map_err(|e| PrimitiveError::PrimitiveFailure(format!("constraint synthesis: {e}")))?;

    let satisfied = cs
        .is_satisfied()
        .map_err(|e| PrimitiveError::PrimitiveFailure(format!("constraint check: {e}")))?;
    if !satisfied {
        let which = cs.which_is_unsatisfied().ok().flatten().unwrap_or_default();
        return Err(PrimitiveError::PrimitiveFailure(format!(
            "circuit input does not satisfy recomputation constraints {which}"
        )));
    }

    tracing::debug!(constraints = cs.num_constraints(), "circuit input consistency verified");
    Ok(())
}
