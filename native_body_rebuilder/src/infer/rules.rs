//! The closed rule table driving type inference over summary calls.
//!
//! Each entry declares, for one native-binding target, the host type of
//! selected operand indices and of selected return index tags. The table is
//! data: adding a primitive is one entry here plus (when it lowers to
//! statements) one handler in the CFG builder.

use indexmap::IndexMap;
use once_cell::sync::Lazy;

use native_body_rebuilder_model::{ClassSignature, Type};

/// A type named by the table. Resolved to a concrete [`Type`] at use time,
/// when the object class standing in for the module is known.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum RuleType {
    Number,
    String,
    Boolean,
    Null,
    Undefined,
    Object,
    AnyArray,
    Any,
}

impl RuleType {
    pub fn to_type(self, object_class: &ClassSignature) -> Type {
        match self {
            RuleType::Number => Type::Number,
            RuleType::String => Type::String,
            RuleType::Boolean => Type::Boolean,
            RuleType::Null => Type::Null,
            RuleType::Undefined => Type::Undefined,
            RuleType::Object => Type::Class(object_class.clone()),
            RuleType::AnyArray => Type::any_array(),
            RuleType::Any => Type::Any,
        }
    }
}

/// One rule: operand-index types and return-tag types for a target.
#[derive(Debug, Clone, Copy)]
pub struct Rule {
    pub operands: &'static [(usize, RuleType)],
    pub rets: &'static [(&'static str, RuleType)],
}

/// Raw native allocators. Their `"-1"` status slot is typed as a string:
/// the allocated buffer is conventionally overwritten by a subsequent
/// string-extract call.
pub const RAW_ALLOCATION_TARGETS: [&str; 4] =
    ["malloc", "operator new", "operator new[]", "xmalloc"];

use RuleType::{Any, AnyArray, Boolean, Null, Number, Object, String as Str, Undefined};

static RULES: Lazy<IndexMap<&'static str, Rule>> = Lazy::new(|| {
    let mut table: IndexMap<&'static str, Rule> = IndexMap::new();

    // Numeric create/extract. The bigint variants carry host numbers too;
    // the host lattice has no separate bigint type.
    for target in [
        "napi_create_double",
        "napi_create_int32",
        "napi_create_uint32",
        "napi_create_int64",
        "napi_create_bigint_int64",
        "napi_create_bigint_uint64",
        "napi_get_value_double",
        "napi_get_value_int32",
        "napi_get_value_uint32",
        "napi_get_value_int64",
        "napi_get_value_bigint_int64",
        "napi_get_value_bigint_uint64",
    ] {
        table.insert(
            target,
            Rule {
                operands: &[(1, Number)],
                rets: &[("2", Number)],
            },
        );
    }

    // String create: (env, source, length, *result).
    for target in [
        "napi_create_string_utf8",
        "napi_create_string_utf16",
        "napi_create_string_latin1",
    ] {
        table.insert(
            target,
            Rule {
                operands: &[(1, Str)],
                rets: &[("3", Str)],
            },
        );
    }

    // String extract: (env, source, buffer, bufsize, *written).
    for target in [
        "napi_get_value_string_utf8",
        "napi_get_value_string_utf16",
        "napi_get_value_string_latin1",
    ] {
        table.insert(
            target,
            Rule {
                operands: &[(1, Str), (2, Str), (3, Number), (4, Number)],
                rets: &[("2", Str), ("4", Number)],
            },
        );
    }

    for target in ["napi_get_boolean", "napi_get_value_bool"] {
        table.insert(
            target,
            Rule {
                operands: &[(1, Boolean)],
                rets: &[("2", Boolean)],
            },
        );
    }

    table.insert(
        "napi_get_undefined",
        Rule {
            operands: &[],
            rets: &[("1", Undefined)],
        },
    );
    table.insert(
        "napi_get_null",
        Rule {
            operands: &[],
            rets: &[("1", Null)],
        },
    );

    for target in ["napi_create_object", "napi_get_prototype"] {
        table.insert(
            target,
            Rule {
                operands: &[(1, Object)],
                rets: &[("2", Object)],
            },
        );
    }

    // Property access family: (env, object, key, value/result).
    for target in ["napi_set_property", "napi_set_named_property"] {
        table.insert(
            target,
            Rule {
                operands: &[(1, Object), (2, Str), (3, Any)],
                rets: &[],
            },
        );
    }
    for target in ["napi_get_property", "napi_get_named_property"] {
        table.insert(
            target,
            Rule {
                operands: &[(1, Object), (2, Str)],
                rets: &[("3", Any)],
            },
        );
    }
    for target in [
        "napi_has_property",
        "napi_delete_property",
        "napi_has_own_property",
        "napi_has_named_property",
    ] {
        table.insert(
            target,
            Rule {
                operands: &[(1, Object), (2, Str)],
                rets: &[("3", Boolean)],
            },
        );
    }
    table.insert(
        "napi_get_all_property_names",
        Rule {
            operands: &[(1, Object)],
            rets: &[("5", AnyArray)],
        },
    );

    // Arrays.
    table.insert(
        "napi_create_array",
        Rule {
            operands: &[],
            rets: &[("2", AnyArray)],
        },
    );
    table.insert(
        "napi_create_array_with_length",
        Rule {
            operands: &[(1, Number)],
            rets: &[("2", AnyArray)],
        },
    );
    table.insert(
        "napi_is_array",
        Rule {
            operands: &[(1, AnyArray)],
            rets: &[("2", Boolean)],
        },
    );
    table.insert(
        "napi_get_array_length",
        Rule {
            operands: &[(1, AnyArray)],
            rets: &[("2", Number)],
        },
    );
    table.insert(
        "napi_set_element",
        Rule {
            operands: &[(1, AnyArray), (2, Number), (3, Any)],
            rets: &[],
        },
    );
    table.insert(
        "napi_get_element",
        Rule {
            operands: &[(1, AnyArray), (2, Number)],
            rets: &[("3", Any)],
        },
    );
    for target in ["napi_has_element", "napi_delete_element"] {
        table.insert(
            target,
            Rule {
                operands: &[(1, AnyArray), (2, Number)],
                rets: &[("3", Boolean)],
            },
        );
    }

    // Coercions.
    table.insert(
        "napi_coerce_to_bool",
        Rule {
            operands: &[(1, Any)],
            rets: &[("2", Boolean)],
        },
    );
    table.insert(
        "napi_coerce_to_number",
        Rule {
            operands: &[(1, Any)],
            rets: &[("2", Number)],
        },
    );
    table.insert(
        "napi_coerce_to_object",
        Rule {
            operands: &[(1, Any)],
            rets: &[("2", Object)],
        },
    );
    table.insert(
        "napi_coerce_to_string",
        Rule {
            operands: &[(1, Any)],
            rets: &[("2", Str)],
        },
    );

    // Log print: (type, level, domain, tag, fmt, args…) behind an env slot.
    table.insert(
        "OH_LOG_Print",
        Rule {
            operands: &[(2, Number), (3, Str), (4, Str)],
            rets: &[],
        },
    );

    for target in RAW_ALLOCATION_TARGETS {
        table.insert(
            target,
            Rule {
                operands: &[(0, Number)],
                rets: &[("-1", Str)],
            },
        );
    }

    table
});

/// The rule for a call target, if the table knows it.
pub fn rule_for(target: &str) -> Option<&'static Rule> {
    RULES.get(target)
}
