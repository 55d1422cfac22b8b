#![no_main]

use abiv2fuzz::{Config, Contract, Parse};
use libfuzzer_sys::fuzz_target;

fuzz_target!(|data: &[u8]| {
    if let Ok(s) = str::from_utf8(data) {
        if let Ok(contract) = Contract::parse(s).into_result() {
            let config = Config::default();
            assert_eq!(contract.to_solidity(&config), contract.to_solidity(&config));
        }
    }
});
