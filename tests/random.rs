use abiv2fuzz::builder::Callee;
use abiv2fuzz::{Config, Contract, Dimension, Generate, Generator, Parse, Scope, Type};
use pretty_assertions::assert_eq;
use rand::prelude::*;

use self::test_helper::*;

const ITERATIONS: u64 = 200;

/// Ids returned by the checks, in emission order.
fn check_ids(checks: &str) -> Vec<u64> {
    checks
        .lines()
        .filter_map(|line| line.trim().strip_suffix(';'))
        .filter_map(|line| line.rsplit_once("return "))
        .map(|(_, id)| id.parse().unwrap())
        .collect()
}

#[test]
fn random_contracts_are_deterministic() {
    let config = Config::default();
    for seed in 0..ITERATIONS {
        let contract = generate_contract(&mut StdRng::seed_from_u64(seed), 6, 3);
        let again = generate_contract(&mut StdRng::seed_from_u64(seed), 6, 3);
        assert_eq!(contract, again);
        assert_eq!(contract.to_solidity(&config), again.to_solidity(&config));
    }
}

#[test]
fn random_names_are_sequential() {
    let config = Config::default();
    for seed in 0..ITERATIONS {
        let contract = generate_contract(&mut StdRng::seed_from_u64(seed), 6, 3);
        let mut generator = Generator::new(&config);
        contract.generate(&mut generator);
        let variables = generator.counters().variables();
        let params = generator.builder().params(Callee::Public);
        let names: Vec<_> = params
            .split(", ")
            .filter(|param| !param.is_empty())
            .map(|param| param.rsplit(' ').next().unwrap().to_string())
            .collect();
        let expected: Vec<_> = (0..variables).map(|i| format!("x_{i}")).collect();
        assert_eq!(names, expected, "{contract}");
    }
}

#[test]
fn random_check_ids_count_from_one() {
    let config = Config::default();
    for seed in 0..ITERATIONS {
        let contract = generate_contract(&mut StdRng::seed_from_u64(seed), 6, 3);
        let mut generator = Generator::new(&config);
        contract.generate(&mut generator);
        let ids = check_ids(generator.builder().checks());
        let expected: Vec<u64> = (1..=ids.len() as u64).collect();
        assert_eq!(ids, expected, "{contract}");
    }
}

#[test]
fn random_dynamic_lengths_are_bounded() {
    let config = Config::default();
    for seed in 0..ITERATIONS {
        let mut rng = StdRng::seed_from_u64(seed);
        let array = generate_array(&mut rng, 4);
        for scope in [Scope::State, Scope::Local] {
            let mut generator = Generator::new(&config);
            generator.set_scope(scope);
            array.generate(&mut generator);
            let builder = generator.builder();
            let text = format!("{}{}", builder.main(), builder.deferred());
            for line in text.lines() {
                let length = if let Some((_, rest)) = line.split_once(".length = ") {
                    rest.trim_end_matches(';')
                } else if let Some((_, rest)) = line.split_once("= new ") {
                    let (_, rest) = rest.rsplit_once('(').unwrap();
                    rest.trim_end_matches(");")
                } else {
                    continue;
                };
                let length: u64 = length.parse().unwrap();
                assert!((2..=4).contains(&length), "{array}: {line}");
            }
        }
    }
}

#[test]
fn random_arrays_with_bad_dimension_counts_are_no_ops() {
    let config = Config::default();
    for seed in 0..ITERATIONS {
        let mut rng = StdRng::seed_from_u64(seed);
        let mut array = generate_array(&mut rng, 4);
        array.dimensions = if rng.random_bool(0.5) {
            vec![]
        } else {
            (0..rng.random_range(5..8))
                .map(|_| generate_dimension(&mut rng, 3))
                .collect()
        };
        let ty: Type = array.into();
        for scope in [Scope::State, Scope::Local] {
            let mut generator = Generator::new(&config);
            generator.set_scope(scope);
            let before = generator.clone();
            ty.generate(&mut generator);
            assert_eq!(generator, before, "{ty}");
        }
    }
}

#[test]
fn random_integer_literals_fit() {
    let config = Config::default();
    for seed in 0..ITERATIONS {
        let mut rng = StdRng::seed_from_u64(seed);
        let width_seed = rng.random();
        let signed = rng.random();
        let ty: Type = abiv2fuzz::IntegerType::from_seed(width_seed, signed).into();
        let mut generator = Generator::new(&config);
        // Burn a few counters so not every literal comes from hash("0").
        for _ in 0..rng.random_range(0..16) {
            generator.next_value();
        }
        ty.generate(&mut generator);

        let checks = generator.builder().checks();
        let literal = checks
            .split("!= ")
            .nth(1)
            .and_then(|rest| rest.split(')').next())
            .unwrap();
        let significant_bits = literal[2..].trim_start_matches('0').len() * 4;
        let width = 8 * (width_seed as usize % 32 + 1);
        let bound = if signed { width - 4 } else { width };
        assert!(significant_bits <= bound, "{ty}: {literal}");
    }
}

#[test]
fn random_display_parses_back() {
    for seed in 0..ITERATIONS {
        let contract = generate_contract(&mut StdRng::seed_from_u64(seed), 6, 3);
        let text = contract.to_string();
        let parsed = Contract::parse(&text).into_result().unwrap();
        // Nested unset variants print as `_` and parse back as `Type::Unset`,
        // both generate nothing.
        let config = Config::default();
        assert_eq!(parsed.to_solidity(&config), contract.to_solidity(&config));
    }
}

#[test]
fn dynamic_dimension_lengths() {
    for counter in 0..30 {
        let length = Dimension::dynamic(7).resolve(counter);
        assert_eq!(length, (7 + counter) % 3 + 2);
    }
}
