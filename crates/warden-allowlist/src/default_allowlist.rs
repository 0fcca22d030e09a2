//! The fixed Default Allowlist (DA): a reasonable starting point for agents
//! that don't declare their own allowlist contribution.
//!
//! Every module here is pure data manipulation, pure computation, or a
//! narrow read of ambient state (clock, randomness). Nothing that touches
//! the filesystem, network, or process control is present, and no function
//! here can turn arbitrary caller-supplied input into a symbolic atom --
//! that class of conversion is excluded everywhere in the DA, not just
//! absent by omission, because it is the one operation that turns a bounded
//! interning table into an unbounded one.

use crate::registry::ModuleRegistry;
use crate::spec::{AllowlistBuilder, AllowlistSpec};

/// The exported-function catalog backing [`default_allowlist`].
pub fn default_module_registry() -> ModuleRegistry {
    let mut reg = ModuleRegistry::new();

    reg.register("Core", ["identity", "equal", "not", "and", "or", "xor"]);

    reg.register(
        "Numbers",
        ["add", "sub", "mul", "div", "rem", "abs", "max", "min", "compare", "round", "floor", "ceil", "to_string", "parse"],
    );

    reg.register("Math", ["pow", "sqrt", "log", "log2", "log10", "exp", "sin", "cos", "tan", "pi"]);

    reg.register(
        "Strings",
        [
            "upcase", "downcase", "trim", "trim_start", "trim_end", "split", "join", "replace", "contains",
            "starts_with", "ends_with", "length", "slice", "reverse", "pad_start", "pad_end",
        ],
    );

    reg.register(
        "Lists",
        [
            "length", "reverse", "sort", "sort_by", "map", "filter", "reduce", "flatten", "concat", "first", "last",
            "nth", "take", "drop", "zip", "uniq", "contains", "sum", "max", "min",
        ],
    );

    reg.register("Maps", ["get", "put", "delete", "keys", "values", "merge", "has_key", "size", "to_list"]);

    reg.register("Sets", ["new", "put", "delete", "union", "intersection", "difference", "member", "size"]);

    reg.register("Tuples", ["new", "size", "get", "to_list"]);

    reg.register("Ranges", ["new", "to_list", "contains", "size"]);

    reg.register(
        "DateTime",
        ["now", "utc_now", "to_iso8601", "from_iso8601", "add_seconds", "diff_seconds", "year", "month", "day"],
    );

    reg.register("Encoding", ["base64_encode", "base64_decode", "uri_encode", "uri_decode", "json_encode", "json_decode"]);

    reg.register("Regex", ["is_match", "find", "find_all", "replace"]);

    reg.register("Binary", ["length", "slice", "concat", "to_hex", "from_hex"]);

    reg.register("Bitwise", ["band", "bor", "bxor", "bnot", "shift_left", "shift_right"]);

    // Deliberately narrow: no atom/symbol interning of arbitrary input, no
    // listing of loaded modules or live processes.
    reg.register("Introspect", ["type_of", "to_string", "size_of"]);

    reg.register("Random", ["uniform", "uniform_range", "shuffle"]);

    // The only process-related operation the DA admits; it cannot observe
    // or affect anything outside the calling evaluation.
    reg.register("Process", ["sleep"]);

    reg
}

/// The fixed Default Allowlist.
///
/// Every listed module is granted `All`; authorization therefore reduces to
/// "is this function actually exported", which [`default_module_registry`]
/// answers.
pub fn default_allowlist() -> AllowlistSpec {
    AllowlistBuilder::new()
        .allow_all("Core")
        .allow_all("Numbers")
        .allow_all("Math")
        .allow_all("Strings")
        .allow_all("Lists")
        .allow_all("Maps")
        .allow_all("Sets")
        .allow_all("Tuples")
        .allow_all("Ranges")
        .allow_all("DateTime")
        .allow_all("Encoding")
        .allow_all("Regex")
        .allow_all("Binary")
        .allow_all("Bitwise")
        .allow_all("Introspect")
        .allow_all("Random")
        .allow_only("Process", ["sleep"])
        .build()
}
