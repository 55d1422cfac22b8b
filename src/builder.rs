//! Output buffers and the fixed program template.

use itertools::Itertools;

use crate::value::VAR_PREFIX;

/// Which callee a parameter list belongs to.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Callee {
    /// `g_public`, reference parameters live in `memory`.
    Public,
    /// `g_external`, reference parameters live in `calldata`.
    External,
}

impl Callee {
    fn location(self) -> &'static str {
        match self {
            Callee::Public => "memory",
            Callee::External => "calldata",
        }
    }
}

/// Append-only sections of the program under construction.
///
/// `main` receives contract level declarations first and the body of `f()`
/// once [`Builder::open_test_function`] has been called.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Builder {
    main: String,
    state_init: String,
    checks: String,
    params_public: Vec<String>,
    params_external: Vec<String>,
}

impl Builder {
    pub fn new() -> Self {
        Builder::default()
    }

    pub fn declare(&mut self, ty: &str, name: &str, qualifier: Option<&str>) {
        match qualifier {
            Some(qualifier) => self.main += &format!("\n\t{ty} {qualifier} {name};"),
            None => self.main += &format!("\n\t{ty} {name};"),
        }
    }

    /// Assignment inside the body of `f()`.
    pub fn assign(&mut self, lhs: &str, rhs: &str) {
        self.main += &format!("\n\t\t{lhs} = {rhs};");
    }

    /// Assignment to a state variable, replayed at the top of `f()` since
    /// state variables cannot be assigned at contract scope.
    pub fn defer_assign(&mut self, lhs: &str, rhs: &str) {
        self.state_init += &format!("\n\t\t{lhs} = {rhs};");
    }

    pub fn check(&mut self, condition: &str, id: u64) {
        self.checks += &format!("\n\t\tif ({condition}) return {id};");
    }

    /// Adds `name` to the parameter lists of both callees.
    pub fn param(&mut self, ty: &str, name: &str, is_value: bool) {
        for callee in [Callee::Public, Callee::External] {
            let param = if is_value {
                format!("{ty} {name}")
            } else {
                format!("{ty} {} {name}", callee.location())
            };
            match callee {
                Callee::Public => self.params_public.push(param),
                Callee::External => self.params_external.push(param),
            }
        }
    }

    pub fn params(&self, callee: Callee) -> String {
        match callee {
            Callee::Public => self.params_public.join(", "),
            Callee::External => self.params_external.join(", "),
        }
    }

    /// Starts `f()` and flushes the deferred state assignments into it.
    pub fn open_test_function(&mut self) {
        self.main += "\n\tfunction f() public returns (uint) {\n\t";
        self.main += &std::mem::take(&mut self.state_init);
    }

    /// Ends `f()`, forwarding the first `variables` generated names to both
    /// callees.
    pub fn close_test_function(&mut self, variables: u64) {
        let names = (0..variables)
            .map(|i| format!("{VAR_PREFIX}{i}"))
            .join(", ");
        self.main += &format!(
            "\n\t\tuint returnVal = this.g_public({names});\
             \n\t\tif (returnVal != 0)\
             \n\t\t\treturn returnVal;\
             \n\t\treturn (uint(1000) + this.g_external({names}));\
             \n\t}}\n\t"
        );
    }

    pub fn main(&self) -> &str {
        &self.main
    }

    pub fn deferred(&self) -> &str {
        &self.state_init
    }

    pub fn checks(&self) -> &str {
        &self.checks
    }

    /// Flattens all sections into the final program.
    pub fn render(self, pragma: &str) -> String {
        let public = self.params(Callee::Public);
        let external = self.params(Callee::External);
        let Builder { main, checks, .. } = self;
        format!(
            "pragma solidity {pragma};\n\
             pragma experimental ABIEncoderV2;\n\
             \n\
             contract Factory {{\n\
             \tfunction test() external returns (uint) {{\n\
             \t\tC c = new C();\n\
             \t\treturn c.f();\n\
             \t}}\n\
             }}\n\
             \n\
             contract C {{\n\
             {main}{STRING_COMPARE}{BYTES_COMPARE}\
             \n\tfunction g_public({public}) public view returns (uint) {{\
             \n\t\t{checks}\
             \n\t\treturn 0;\
             \n\t}}\
             \n\
             \n\tfunction g_external({external}) external view returns (uint) {{\
             \n\t\t{checks}\
             \n\t\treturn 0;\
             \n\t}}\
             \n\t\
             \n}}"
        )
    }
}

const STRING_COMPARE: &str = "\n\tfunction stringCompare(string memory a, string memory b) internal pure returns (bool) {\
    \n\t\tif(bytes(a).length != bytes(b).length)\
    \n\t\t\treturn false;\
    \n\t\telse\
    \n\t\t\treturn keccak256(bytes(a)) == keccak256(bytes(b));\
    \n\t}\n\t";

const BYTES_COMPARE: &str = "\n\tfunction bytesCompare(bytes memory a, bytes memory b) internal pure returns (bool) {\
    \n\t\tif(a.length != b.length)\
    \n\t\t\treturn false;\
    \n\t\tfor (uint i = 0; i < a.length; i++)\
    \n\t\t\tif (a[i] != b[i])\
    \n\t\t\t\treturn false;\
    \n\t\treturn true;\
    \n\t}\n\t";

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;

    #[test]
    fn declarations() {
        let mut builder = Builder::new();
        builder.declare("uint8", "x_0", None);
        builder.declare("bytes", "x_1", Some("memory"));
        assert_eq!(builder.main(), "\n\tuint8 x_0;\n\tbytes memory x_1;");
    }

    #[test]
    fn params_are_qualified_per_callee() {
        let mut builder = Builder::new();
        builder.param("uint8", "x_0", true);
        builder.param("uint8[2]", "x_1", false);
        assert_eq!(
            builder.params(Callee::Public),
            "uint8 x_0, uint8[2] memory x_1"
        );
        assert_eq!(
            builder.params(Callee::External),
            "uint8 x_0, uint8[2] calldata x_1"
        );
    }

    #[test]
    fn deferred_assignments_move_into_f() {
        let mut builder = Builder::new();
        builder.defer_assign("x_0", "1");
        assert_eq!(builder.deferred(), "\n\t\tx_0 = 1;");
        builder.open_test_function();
        assert_eq!(builder.deferred(), "");
        assert!(builder.main().ends_with("{\n\t\n\t\tx_0 = 1;"));
    }

    #[test]
    fn checks_return_their_id() {
        let mut builder = Builder::new();
        builder.check("x_0 != 1", 1);
        builder.check("!bytesCompare(x_1, \"ab\")", 2);
        assert_eq!(
            builder.checks(),
            "\n\t\tif (x_0 != 1) return 1;\n\t\tif (!bytesCompare(x_1, \"ab\")) return 2;"
        );
    }

    #[test]
    fn empty_program() {
        let mut builder = Builder::new();
        builder.open_test_function();
        builder.close_test_function(0);
        let program = builder.render(">=0.0");
        assert!(program.starts_with("pragma solidity >=0.0;\npragma experimental ABIEncoderV2;"));
        assert!(program.contains("uint returnVal = this.g_public();"));
        assert!(program.contains("return (uint(1000) + this.g_external());"));
        assert!(program.contains("function g_public() public view returns (uint)"));
        assert!(program.contains("function g_external() external view returns (uint)"));
        assert!(program.contains("function stringCompare(string memory a, string memory b)"));
        assert!(program.contains("function bytesCompare(bytes memory a, bytes memory b)"));
        assert!(program.ends_with("\n}"));
    }
}
