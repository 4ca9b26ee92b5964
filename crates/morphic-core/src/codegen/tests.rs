//! Tests for plan synthesis and loading
//!
//! Copyright (c) 2025 Morphic Team
//! Licensed under the Apache-2.0 license

#[cfg(test)]
mod tests {
    use super::super::*;
    use crate::error::EvalError;
    use crate::function::{CallArgs, Function};
    use crate::value::{Record, Value};
    use pretty_assertions::assert_eq;

    fn upper() -> Function {
        Function::new("upper", |args| match args.single("upper")? {
            Value::Str(s) => Ok(Value::Str(s.to_uppercase())),
            other => Err(EvalError::type_mismatch("str", other.type_name(), "upper()")),
        })
    }

    fn sig(names: &[&str]) -> Signature {
        Signature::positional(names.iter().copied()).unwrap()
    }

    fn synthesize(plan: &Plan, signature: &Signature) -> SynthesizedUnit {
        Synthesizer::new().synthesize(plan, signature).unwrap()
    }

    fn user(name: &str) -> Value {
        Value::object(Record::new("User").with_field("name", name))
    }

    #[test]
    fn test_literal_constant_is_inlined() {
        let unit = synthesize(&Plan::constant(42), &sig(&[]));
        assert_eq!(unit.source(), "def broaching_closure():\n    return 42\n");
        assert!(unit.captures.is_empty());
    }

    #[test]
    fn test_opaque_constant_is_captured_by_reference() {
        let object = user("alice");
        let unit = synthesize(&Plan::constant(object.clone()), &sig(&[]));
        assert_eq!(unit.source(), "def broaching_closure():\n    return constant_0\n");
        assert_eq!(unit.captures.len(), 1);
        assert!(unit.captures.get("constant_0").unwrap().is_same(&object));
    }

    #[test]
    fn test_equal_but_distinct_objects_get_distinct_bindings() {
        let pair = Function::new("pair", |args| Ok(Value::Tuple(args.positional)));
        let plan = Plan::call(
            pair,
            [
                PlanArg::positional(Plan::constant(user("a"))),
                PlanArg::positional(Plan::constant(user("a"))),
            ],
        );
        let unit = synthesize(&plan, &sig(&[]));
        assert_eq!(unit.source(), "def broaching_closure():\n    return pair(constant_0, constant_1)\n");
        assert_eq!(unit.captures.len(), 3);
    }

    #[test]
    fn test_identity_call_is_eliminated() {
        let plan = Plan::call(Function::identity(), [PlanArg::positional(Plan::param("x"))]);
        let unit = synthesize(&plan, &sig(&["x"]));
        assert_eq!(unit.source(), "def broaching_closure(x):\n    return x\n");
        assert!(unit.captures.is_empty());
    }

    #[test]
    fn test_identity_with_keyword_is_kept() {
        let plan = Plan::call(
            Function::identity(),
            [PlanArg::keyword("value", Plan::param("x"))],
        );
        let unit = synthesize(&plan, &sig(&["x"]));
        assert_eq!(unit.source(), "def broaching_closure(x):\n    return identity(value=x)\n");
    }

    #[test]
    fn test_accessor_rendering() {
        let dotted = synthesize(&Plan::attr(Plan::param("obj"), "value"), &sig(&["obj"]));
        assert_eq!(dotted.function.body.to_string(), "obj.value");

        let dynamic = synthesize(&Plan::attr(Plan::param("obj"), "123bad"), &sig(&["obj"]));
        assert_eq!(dynamic.function.body.to_string(), "getattr(obj, '123bad')");
        assert!(dynamic.captures.is_empty());
    }

    #[test]
    fn test_item_accessors() {
        let literal = synthesize(&Plan::item(Plan::param("d"), "key"), &sig(&["d"]));
        assert_eq!(literal.function.body.to_string(), "d['key']");

        let opaque_key = Plan::item(Plan::param("d"), user("k"));
        let captured = synthesize(&opaque_key, &sig(&["d"]));
        assert_eq!(captured.function.body.to_string(), "accessor_0(d)");
        assert!(captured.captures.get("accessor_0").unwrap().as_function().is_some());
    }

    #[test]
    fn test_function_name_collides_with_parameter() {
        let plan = Plan::call(upper(), [PlanArg::positional(Plan::param("upper"))]);
        let unit = synthesize(&plan, &sig(&["upper"]));
        assert_eq!(unit.function.body.to_string(), "upper_1(upper)");
        assert!(unit.captures.get("upper").is_none());
    }

    #[test]
    fn test_function_names_are_sanitized_or_counted() {
        let anonymous = Function::anonymous(|args| args.single("anonymous"));
        let odd = Function::new("<lambda>", |args| args.single("<lambda>"));
        let plan = Plan::call(
            anonymous,
            [PlanArg::positional(Plan::call(odd, [PlanArg::positional(Plan::param("x"))]))],
        );
        let unit = synthesize(&plan, &sig(&["x"]));
        assert_eq!(unit.function.body.to_string(), "func_0(_lambda_(x))");
    }

    #[test]
    fn test_reserved_names_are_never_bound() {
        let getattr = Function::new("getattr", |args| args.single("getattr"));
        let plan = Plan::call(getattr, [PlanArg::positional(Plan::param("x"))]);
        let unit = synthesize(&plan, &sig(&["x"]));
        assert_eq!(unit.function.body.to_string(), "getattr_1(x)");
    }

    #[test]
    fn test_argument_kinds_are_ordered() {
        let collect = Function::new("collect", |args| Ok(Value::Int(args.positional.len() as i64)));
        let plan = Plan::call(
            collect,
            [
                PlanArg::keyword("k", Plan::param("a")),
                PlanArg::positional(Plan::param("a")),
                PlanArg::UnpackMapping(Plan::param("m")),
                PlanArg::UnpackIterable(Plan::param("s")),
            ],
        );
        let unit = synthesize(&plan, &sig(&["a", "s", "m"]));
        assert_eq!(unit.function.body.to_string(), "collect(a, *s, k=a, **m)");
    }

    #[test]
    fn test_unknown_parameter_is_rejected() {
        let err = Synthesizer::new()
            .synthesize(&Plan::param("y"), &sig(&["x"]))
            .unwrap_err();
        assert_eq!(err, CodegenError::UnknownParameter { name: "y".to_string() });
    }

    #[test]
    fn test_invalid_keyword_is_rejected() {
        let plan = Plan::call(upper(), [PlanArg::keyword("not valid", Plan::param("x"))]);
        let err = Synthesizer::new().synthesize(&plan, &sig(&["x"])).unwrap_err();
        assert!(matches!(err, CodegenError::InvalidKeyword { .. }));
    }

    #[test]
    fn test_repeated_keyword_is_rejected() {
        let plan = Plan::call(
            upper(),
            [
                PlanArg::keyword("s", Plan::param("x")),
                PlanArg::keyword("s", Plan::param("x")),
            ],
        );
        let err = Synthesizer::new().synthesize(&plan, &sig(&["x"])).unwrap_err();
        assert_eq!(err, CodegenError::DuplicateKeyword { key: "s".to_string() });
    }

    #[test]
    fn test_parameter_shadowing_reserved_name_is_rejected() {
        let err = Synthesizer::new()
            .synthesize(&Plan::attr(Plan::param("x"), "name"), &sig(&["x", "getattr"]))
            .unwrap_err();
        assert_eq!(err, CodegenError::NameCollision { name: "getattr".to_string() });

        let custom = Synthesizer::new().with_reserved_names(["len"]);
        let err = custom.synthesize(&Plan::param("len"), &sig(&["len"])).unwrap_err();
        assert_eq!(err, CodegenError::NameCollision { name: "len".to_string() });
    }

    #[test]
    fn test_signature_is_copied_without_annotations() {
        let signature = Signature::new(vec![
            Parameter::new("a", ParameterKind::PositionalOnly).with_annotation("User"),
            Parameter::new("b", ParameterKind::KeywordOnly).with_annotation("int"),
        ])
        .unwrap()
        .with_return_annotation("str");
        let unit = synthesize(&Plan::param("b"), &signature);
        assert_eq!(unit.source(), "def broaching_closure(a, /, *, b):\n    return b\n");
        assert_eq!(unit.signature(), &signature);
    }

    #[test]
    fn test_custom_closure_name() {
        let synthesizer = Synthesizer::new().with_closure_name("convert").unwrap();
        let unit = synthesizer.synthesize(&Plan::param("x"), &sig(&["x"])).unwrap();
        assert!(unit.source().starts_with("def convert(x):"));
        assert!(Synthesizer::new().with_closure_name("not valid").is_err());
    }

    #[test]
    fn test_loaded_closure_end_to_end() {
        let plan = Plan::call(upper(), [PlanArg::positional(Plan::attr(Plan::param("x"), "name"))]);
        let unit = synthesize(&plan, &sig(&["x"]));
        let closure = Loader::new().load(unit).unwrap();

        assert_eq!(closure.call(CallArgs::positional([user("bob")])).unwrap(), Value::from("BOB"));
        assert_eq!(
            closure.call(CallArgs::new().with_keyword("x", user("eve"))).unwrap(),
            Value::from("EVE")
        );
        assert_eq!(
            closure.call(CallArgs::positional([Value::object(Record::new("Empty"))])),
            Err(EvalError::MissingAttribute {
                type_name: "Empty".to_string(),
                attribute: "name".to_string()
            })
        );
    }

    #[test]
    fn test_loaded_closure_unpacks_arguments() {
        let join = Function::new("join", |args| {
            let mut parts: Vec<String> = args.positional.iter().map(Value::to_string).collect();
            parts.extend(args.keyword.iter().map(|(k, v)| format!("{}={}", k, v)));
            Ok(Value::Str(parts.join(",")))
        });
        let plan = Plan::call(
            join,
            [
                PlanArg::UnpackIterable(Plan::param("items")),
                PlanArg::UnpackMapping(Plan::param("options")),
            ],
        );
        let closure = Loader::new()
            .load(synthesize(&plan, &sig(&["items", "options"])))
            .unwrap();
        let result = closure
            .call(CallArgs::positional([
                Value::List(vec![Value::from(1), Value::from(2)]),
                Value::Map(vec![(Value::from("k"), Value::from("v"))]),
            ]))
            .unwrap();
        assert_eq!(result, Value::from("1,2,k='v'"));
    }

    #[test]
    fn test_loaded_closure_unpacks_strings_and_mapping_keys() {
        let spread = Function::new("spread", |args| Ok(Value::List(args.positional.clone())));
        let plan = Plan::call(spread, [PlanArg::UnpackIterable(Plan::param("items"))]);
        let closure = Loader::new()
            .load(synthesize(&plan, &sig(&["items"])))
            .unwrap();

        assert_eq!(
            closure.call(CallArgs::positional([Value::from("ab")])).unwrap(),
            Value::List(vec![Value::from("a"), Value::from("b")])
        );
        let mapping = Value::Map(vec![
            (Value::from("k"), Value::from(1)),
            (Value::from(2), Value::from(3)),
        ]);
        assert_eq!(
            closure.call(CallArgs::positional([mapping])).unwrap(),
            Value::List(vec![Value::from("k"), Value::from(2)])
        );
        assert!(matches!(
            closure.call(CallArgs::positional([Value::from(5)])),
            Err(EvalError::TypeMismatch { .. })
        ));
    }

    #[test]
    fn test_loader_rejects_unbound_names() {
        let unit = SynthesizedUnit {
            function: FunctionDef {
                name: "broken".to_string(),
                signature: sig(&["x"]),
                body: Expr::Name("ghost".to_string()),
            },
            captures: CaptureTable::default(),
        };
        assert_eq!(
            Loader::new().load(unit).unwrap_err(),
            CodegenError::UnboundName { name: "ghost".to_string() }
        );
    }

    #[test]
    fn test_closure_into_function_keeps_name() {
        let closure = Loader::new()
            .load(synthesize(&Plan::constant(7), &sig(&[])))
            .unwrap();
        assert_eq!(closure.to_string(), "<closure broaching_closure()>");
        let function = closure.into_function();
        assert_eq!(function.name(), Some("broaching_closure"));
        assert_eq!(function.call(CallArgs::new()).unwrap(), Value::from(7));
    }
}
