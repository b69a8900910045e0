//! Poseidon R1CS gadgets for in-circuit hashing.

use ark_bn254::Fr;
use ark_crypto_primitives::sponge::constraints::CryptographicSpongeVar;
use ark_crypto_primitives::sponge::poseidon::constraints::PoseidonSpongeVar;
use ark_crypto_primitives::sponge::poseidon::PoseidonConfig;
use ark_r1cs_std::fields::fp::FpVar;
use ark_r1cs_std::fields::FieldVar;
use ark_relations::r1cs::{ConstraintSystemRef, SynthesisError};

/// Hash a sequence of field elements in-circuit.
///
/// Mirrors [`super::PoseidonHasher::hash`], including the arity tag.
pub fn poseidon_hash_var(
    cs: ConstraintSystemRef<Fr>,
    config: &PoseidonConfig<Fr>,
    inputs: &[FpVar<Fr>],
) -> Result<FpVar<Fr>, SynthesisError> {
    let mut sponge = PoseidonSpongeVar::new(cs, config);
    sponge.absorb(&FpVar::constant(Fr::from(inputs.len() as u64)))?;
    for input in inputs {
        sponge.absorb(input)?;
    }
    let result = sponge.squeeze_field_elements(1)?;
    Ok(result[0].clone())
}

/// Hash two field elements in-circuit.
pub fn poseidon_hash_two_var(
    cs: ConstraintSystemRef<Fr>,
    config: &PoseidonConfig<Fr>,
    a: &FpVar<Fr>,
    b: &FpVar<Fr>,
) -> Result<FpVar<Fr>, SynthesisError> {
    poseidon_hash_var(cs, config, &[a.clone(), b.clone()])
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::poseidon::PoseidonHasher;
    use ark_r1cs_std::alloc::AllocVar;
    use ark_r1cs_std::eq::EqGadget;
    use ark_relations::r1cs::ConstraintSystem;

    #[test]
    fn test_gadget_matches_native() {
        let hasher = PoseidonHasher::new().unwrap();
        let cs = ConstraintSystem::<Fr>::new_ref();

        let a = Fr::from(42u64);
        let b = Fr::from(123u64);

        let a_var = FpVar::new_witness(cs.clone(), || Ok(a)).unwrap();
        let b_var = FpVar::new_witness(cs.clone(), || Ok(b)).unwrap();

        let result_var = poseidon_hash_two_var(cs.clone(), hasher.config(), &a_var, &b_var).unwrap();
        let expected = hasher.hash_two(a, b);

        let expected_var = FpVar::new_input(cs.clone(), || Ok(expected)).unwrap();
        result_var.enforce_equal(&expected_var).unwrap();

        assert!(cs.is_satisfied().unwrap());
    }

    #[test]
    fn test_gadget_rejects_wrong_output() {
        let hasher = PoseidonHasher::new().unwrap();
        let cs = ConstraintSystem::<Fr>::new_ref();

        let a_var = FpVar::new_witness(cs.clone(), || Ok(Fr::from(1u64))).unwrap();
        let b_var = FpVar::new_witness(cs.clone(), || Ok(Fr::from(2u64))).unwrap();
        let result_var = poseidon_hash_two_var(cs.clone(), hasher.config(), &a_var, &b_var).unwrap();

        let wrong = hasher.hash_two(Fr::from(2u64), Fr::from(1u64));
        let wrong_var = FpVar::new_input(cs.clone(), || Ok(wrong)).unwrap();
        result_var.enforce_equal(&wrong_var).unwrap();

        assert!(!cs.is_satisfied().unwrap());
    }
}
