#![no_main]

use abiv2fuzz::{Config, Generate, Generator};
use libfuzzer_sys::fuzz_target;
use rand::prelude::*;

#[path = "../../tests/test_helper.rs"]
mod test_helper;
use self::test_helper::*;

fuzz_target!(|data: &[u8]| {
    if let Ok(seed) = data.try_into() {
        let mut rng = StdRng::from_seed(seed);
        let max_state_vars = rng.random_range(0..16);
        let max_locals = rng.random_range(0..4);
        let contract = generate_contract(&mut rng, max_state_vars, max_locals);
        let config = Config::default();
        let mut generator = Generator::new(&config);
        contract.generate(&mut generator);
        let variables = generator.counters().variables();
        let program = generator.finish();
        assert!(program.ends_with("\n}"));
        if variables > 0 {
            assert!(program.contains(&format!("x_{}", variables - 1)));
        }
    }
});
