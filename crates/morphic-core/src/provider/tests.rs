//! Tests for the request/provider protocol
//!
//! Copyright (c) 2025 Morphic Team
//! Licensed under the Apache-2.0 license

#[cfg(test)]
mod tests {
    use super::super::*;
    use crate::codegen::{Plan, PlanArg, Signature};
    use crate::config::EngineConfig;
    use crate::function::{CallArgs, Function};
    use crate::types::TypeRef;
    use crate::value::{Record, Value};
    use crate::Error;
    use std::sync::atomic::{AtomicUsize, Ordering};
    use std::sync::Arc;

    /// Answers with a fixed name and counts its invocations
    struct Fixed {
        answer: &'static str,
        calls: Arc<AtomicUsize>,
    }

    impl Fixed {
        fn new(answer: &'static str) -> (Self, Arc<AtomicUsize>) {
            let calls = Arc::new(AtomicUsize::new(0));
            (
                Self {
                    answer,
                    calls: calls.clone(),
                },
                calls,
            )
        }
    }

    impl Provider for Fixed {
        fn name(&self) -> &str {
            self.answer
        }

        fn provide(&self, _mediator: &Mediator<'_>, _request: &Request) -> ProvideResult {
            self.calls.fetch_add(1, Ordering::SeqCst);
            Ok(Answer::Name(self.answer.to_string()))
        }
    }

    fn refusing(name: &'static str) -> FnProvider<impl Fn(&Mediator<'_>, &Request) -> ProvideResult> {
        FnProvider::new(name, move |_: &Mediator<'_>, _: &Request| {
            Err(ProvideError::refuse(format!("{} never answers", name)))
        })
    }

    fn parser_int() -> Request {
        Request::parser(TypeRef::int())
    }

    #[test]
    fn test_first_answering_provider_wins() {
        let (first, first_calls) = Fixed::new("first");
        let (second, second_calls) = Fixed::new("second");
        let resolver = Resolver::new(
            ProviderChain::new()
                .with_checked(TypeRef::int(), first)
                .with(second),
        );

        assert_eq!(resolver.resolve_name(&parser_int()).unwrap(), "first");
        assert_eq!(first_calls.load(Ordering::SeqCst), 1);
        assert_eq!(second_calls.load(Ordering::SeqCst), 0);
    }

    #[test]
    fn test_refusal_moves_to_next_provider() {
        let (fallback, _) = Fixed::new("fallback");
        let resolver = Resolver::new(
            ProviderChain::new()
                .with_checked(TypeRef::int(), refusing("picky"))
                .with(fallback),
        );
        assert_eq!(resolver.resolve_name(&parser_int()).unwrap(), "fallback");
    }

    #[test]
    fn test_no_provider_found_lists_refusals() {
        let (never, calls) = Fixed::new("never");
        let resolver = Resolver::new(
            ProviderChain::new()
                .with_checked(TypeRef::str(), never)
                .with_checked(TypeRef::int(), refusing("picky")),
        );

        match resolver.resolve(&parser_int()) {
            Err(ResolveError::NoProviderFound { request, refusals }) => {
                assert_eq!(request, parser_int());
                assert_eq!(refusals.len(), 2);
                assert_eq!(refusals[0].position, 0);
                assert!(refusals[0].reason.contains("not a subclass of str"));
                assert_eq!(refusals[1].provider, "picky");
            }
            other => panic!("expected NoProviderFound, got {:?}", other),
        }
        assert_eq!(calls.load(Ordering::SeqCst), 0);
    }

    #[test]
    fn test_refusals_are_not_collected_when_disabled() {
        let mut config = EngineConfig::default();
        config.resolution.collect_refusals = false;
        let resolver =
            Resolver::with_config(ProviderChain::new().with(refusing("picky")), config).unwrap();
        match resolver.resolve(&parser_int()) {
            Err(ResolveError::NoProviderFound { refusals, .. }) => assert!(refusals.is_empty()),
            other => panic!("expected NoProviderFound, got {:?}", other),
        }
    }

    #[test]
    fn test_empty_chain_finds_nothing() {
        let resolver = Resolver::new(ProviderChain::new());
        assert!(matches!(
            resolver.resolve(&parser_int()),
            Err(ResolveError::NoProviderFound { .. })
        ));
    }

    #[test]
    fn test_provider_failure_stops_the_walk() {
        let (fallback, calls) = Fixed::new("fallback");
        let broken = FnProvider::new("broken", |_: &Mediator<'_>, _: &Request| {
            Err(anyhow::anyhow!("corrupted table").into())
        });
        let resolver = Resolver::new(ProviderChain::new().with(broken).with(fallback));

        match resolver.resolve(&parser_int()) {
            Err(ResolveError::ProviderFailed { provider, source, .. }) => {
                assert_eq!(provider, "broken");
                assert_eq!(source.to_string(), "corrupted table");
            }
            other => panic!("expected ProviderFailed, got {:?}", other),
        }
        assert_eq!(calls.load(Ordering::SeqCst), 0);
    }

    #[test]
    fn test_next_provider_skips_to_rest_of_chain() {
        let (target, calls) = Fixed::new("target");
        let resolver = Resolver::new(
            ProviderChain::new()
                .with_checked(TypeRef::int(), NextProvider)
                .with_checked(TypeRef::int(), target),
        );
        assert_eq!(resolver.resolve_name(&parser_int()).unwrap(), "target");
        assert_eq!(calls.load(Ordering::SeqCst), 1);
    }

    #[test]
    fn test_exhausted_delegation_does_not_retry_providers() {
        let retried = Arc::new(AtomicUsize::new(0));
        let counter = retried.clone();
        let delegating = FnProvider::new("delegating", move |m: &Mediator<'_>, _: &Request| {
            counter.fetch_add(1, Ordering::SeqCst);
            m.provide_from_next()
        });
        let resolver = Resolver::new(
            ProviderChain::new()
                .with_checked(TypeRef::int(), delegating)
                .with_checked(TypeRef::int(), refusing("tail")),
        );

        match resolver.resolve(&parser_int()) {
            Err(ResolveError::NoProviderFound { refusals, .. }) => {
                assert_eq!(refusals.len(), 1);
                assert_eq!(refusals[0].provider, "tail");
                assert_eq!(refusals[0].position, 1);
            }
            other => panic!("expected NoProviderFound, got {:?}", other),
        }
        assert_eq!(retried.load(Ordering::SeqCst), 1);
    }

    #[test]
    fn test_provider_can_decorate_delegated_answer() {
        let (inner, _) = Fixed::new("inner");
        let decorating = FnProvider::new("decorating", |m: &Mediator<'_>, _: &Request| {
            let name = m.provide_from_next()?.into_name().map_err(anyhow::Error::from)?;
            Ok(Answer::Name(format!("decorated {}", name)))
        });
        let resolver = Resolver::new(ProviderChain::new().with_checked(TypeRef::int(), decorating).with(inner));
        assert_eq!(resolver.resolve_name(&parser_int()).unwrap(), "decorated inner");
    }

    #[test]
    fn test_constraining_proxy_refuses_without_invoking_inner() {
        let (inner, calls) = Fixed::new("inner");
        let (fallback, _) = Fixed::new("fallback");
        let proxy = ConstrainingProxyProvider::new(RequestChecker::field_name("count"), inner);
        let resolver = Resolver::new(ProviderChain::new().with(proxy).with(fallback));

        assert_eq!(resolver.resolve_name(&parser_int()).unwrap(), "fallback");
        assert_eq!(calls.load(Ordering::SeqCst), 0);

        let field = Request::parser_field(TypeRef::int(), "count");
        assert_eq!(resolver.resolve_name(&field).unwrap(), "inner");
        assert_eq!(calls.load(Ordering::SeqCst), 1);
    }

    #[test]
    fn test_composite_checker_over_both_axes() {
        let checker = RequestChecker::subclass(TypeRef::int()).and("count");

        assert!(checker.accepts(&Request::parser_field(TypeRef::int(), "count")));
        assert!(checker.accepts(&Request::parser_field(TypeRef::bool(), "count")));
        assert!(!checker.accepts(&Request::parser_field(TypeRef::str(), "count")));
        assert!(!checker.accepts(&Request::parser_field(TypeRef::int(), "total")));
        assert!(!checker.accepts(&Request::parser(TypeRef::int())));

        let either = RequestChecker::subclass(TypeRef::str()).or(RequestKind::Serializer);
        assert!(either.accepts(&Request::parser(TypeRef::str())));
        assert!(either.accepts(&Request::serializer(TypeRef::int())));
        assert!(!either.accepts(&Request::parser(TypeRef::int())));

        let not_int = RequestChecker::subclass(TypeRef::int()).negate();
        assert!(!not_int.accepts(&Request::parser(TypeRef::bool())));
        assert!(not_int.accepts(&Request::parser(TypeRef::float())));
        assert_eq!(not_int.clone().negate(), RequestChecker::subclass(TypeRef::int()));
        assert_eq!(checker.to_string(), "(subclass of int and field 'count')");
    }

    #[test]
    fn test_subclass_checker_ignores_same_name_types() {
        let base = TypeRef::named("Base");
        let plain = TypeRef::named("Model");
        let derived = TypeRef::new("Model", [base.clone()]);

        let checker = RequestChecker::subclass(derived.clone());
        assert!(checker.check(&Request::parser(plain.clone())).is_err());
        assert!(checker.check(&Request::parser(derived.clone())).is_ok());
        assert!(!RequestChecker::subclass(base.clone()).accepts(&Request::parser(plain.clone())));

        let table = ClassDispatcher::new().with(derived, Answer::Name("derived".into()));
        let resolver = Resolver::new(ProviderChain::new().with(TypeDispatchProvider::new(
            "models",
            RequestKind::Parser,
            table,
        )));
        assert!(matches!(
            resolver.resolve(&Request::parser(plain)),
            Err(ResolveError::NoProviderFound { .. })
        ));
    }

    #[test]
    fn test_nested_unsatisfied_request_becomes_refusal() {
        let (fallback, _) = Fixed::new("fallback");
        let needs_str = FnProvider::new("needs_str", |m: &Mediator<'_>, _: &Request| {
            Ok(m.resolve(&Request::parser(TypeRef::str()))?)
        });
        let resolver = Resolver::new(
            ProviderChain::new()
                .with_checked(TypeRef::int(), needs_str)
                .with_checked(TypeRef::int(), fallback),
        );
        assert_eq!(resolver.resolve_name(&parser_int()).unwrap(), "fallback");
    }

    #[test]
    fn test_nested_failure_propagates_unchanged() {
        let broken = FnProvider::new("broken", |_: &Mediator<'_>, _: &Request| {
            Err(anyhow::anyhow!("boom").into())
        });
        let (fallback, _) = Fixed::new("fallback");
        let asks_str = FnProvider::new("asks_str", |m: &Mediator<'_>, _: &Request| {
            Ok(m.resolve(&Request::parser(TypeRef::str()))?)
        });
        let resolver = Resolver::new(
            ProviderChain::new()
                .with_checked(TypeRef::int(), asks_str)
                .with_checked(TypeRef::str(), broken)
                .with(fallback),
        );
        match resolver.resolve(&parser_int()) {
            Err(ResolveError::ProviderFailed { provider, request, .. }) => {
                assert_eq!(provider, "broken");
                assert_eq!(request, Request::parser(TypeRef::str()));
            }
            other => panic!("expected ProviderFailed, got {:?}", other),
        }
    }

    #[test]
    fn test_depth_guard_stops_runaway_recursion() {
        let recursive = FnProvider::new("recursive", |m: &Mediator<'_>, r: &Request| Ok(m.resolve(r)?));
        let mut config = EngineConfig::default();
        config.resolution.max_depth = 4;
        let resolver = Resolver::with_config(ProviderChain::new().with(recursive), config).unwrap();
        assert!(matches!(
            resolver.resolve(&parser_int()),
            Err(ResolveError::DepthLimitExceeded { limit: 4, .. })
        ));
    }

    #[test]
    fn test_pipeline_composes_stage_functions() {
        let add_one = Function::new("add_one", |args| {
            Ok(Value::Int(args.single("add_one")?.as_int().unwrap_or_default() + 1))
        });
        let triple = Function::new("triple", |args| {
            Ok(Value::Int(args.single("triple")?.as_int().unwrap_or_default() * 3))
        });
        let stage = |f: Function| {
            FnProvider::new(f.name().unwrap_or("stage").to_string(), move |_: &Mediator<'_>, _: &Request| {
                Ok(Answer::Function(f.clone()))
            })
        };
        let pipeline = Pipeline::composing("add_then_triple")
            .stage(stage(add_one))
            .stage(stage(triple));
        let resolver = Resolver::new(ProviderChain::new().with(pipeline));

        let function = resolver.resolve_function(&parser_int()).unwrap();
        assert_eq!(
            function.call(CallArgs::positional([Value::from(1)])).unwrap(),
            Value::from(6)
        );
    }

    #[test]
    fn test_pipeline_refuses_when_any_stage_refuses() {
        let (first, _) = Fixed::new("first");
        let (fallback, _) = Fixed::new("fallback");
        let pipeline = Pipeline::new("collect", CollectAnswers)
            .stage(first)
            .stage(refusing("second"));
        let resolver = Resolver::new(ProviderChain::new().with_checked(TypeRef::int(), pipeline).with(fallback));
        assert_eq!(resolver.resolve_name(&parser_int()).unwrap(), "fallback");
    }

    #[test]
    fn test_empty_pipeline_refuses() {
        let (fallback, _) = Fixed::new("fallback");
        let resolver = Resolver::new(
            ProviderChain::new()
                .with(Pipeline::composing("empty_compose"))
                .with(Pipeline::new("empty_collect", CollectAnswers))
                .with(fallback),
        );
        assert_eq!(resolver.resolve_name(&parser_int()).unwrap(), "fallback");

        let lonely = Resolver::new(ProviderChain::new().with(Pipeline::composing("empty")));
        match lonely.resolve(&parser_int()) {
            Err(ResolveError::NoProviderFound { refusals, .. }) => {
                assert!(refusals[0].reason.contains("no stages"));
            }
            other => panic!("expected NoProviderFound, got {:?}", other),
        }
    }

    #[test]
    fn test_pipeline_collects_answers() {
        let (first, _) = Fixed::new("first");
        let (second, _) = Fixed::new("second");
        let pipeline = Pipeline::new("collect", CollectAnswers).stage(first).stage(second);
        let resolver = Resolver::new(ProviderChain::new().with(pipeline));
        let answers = resolver.resolve(&parser_int()).unwrap().into_many().unwrap();
        assert_eq!(
            answers,
            vec![Answer::Name("first".into()), Answer::Name("second".into())]
        );
    }

    #[test]
    fn test_pipeline_with_custom_reducer() {
        let (first, _) = Fixed::new("a");
        let (second, _) = Fixed::new("b");
        let join = |_: &Request, answers: Vec<Answer>| -> ProvideResult {
            let names = answers
                .into_iter()
                .map(Answer::into_name)
                .collect::<Result<Vec<_>, _>>()
                .map_err(anyhow::Error::from)?;
            Ok(Answer::Name(names.join("+")))
        };
        let pipeline = Pipeline::new("join", join).stage(first).stage(second);
        let resolver = Resolver::new(ProviderChain::new().with(pipeline));
        assert_eq!(resolver.resolve_name(&parser_int()).unwrap(), "a+b");
    }

    #[test]
    fn test_compose_reducer_rejects_non_functions() {
        let (name, _) = Fixed::new("not_a_function");
        let resolver = Resolver::new(ProviderChain::new().with(Pipeline::composing("bad").stage(name)));
        assert!(matches!(
            resolver.resolve(&parser_int()),
            Err(ResolveError::ProviderFailed { .. })
        ));
    }

    #[test]
    fn test_static_provider_dispatches_by_kind() {
        let provider = StaticProvider::builder("names")
            .action(RequestKind::NameMapping, |_: &Mediator<'_>, r: &Request| {
                Ok(Answer::Name(r.field_name().unwrap_or_default().to_uppercase()))
            })
            .build()
            .unwrap();
        assert_eq!(provider.kinds().collect::<Vec<_>>(), [RequestKind::NameMapping]);
        let resolver = Resolver::new(ProviderChain::new().with(provider));

        let request = Request::name_mapping(TypeRef::str(), "user_id");
        assert_eq!(resolver.resolve_name(&request).unwrap(), "USER_ID");
        assert!(resolver.resolve(&parser_int()).is_err());
    }

    #[test]
    fn test_static_provider_rejects_duplicate_kinds() {
        let noop = |_: &Mediator<'_>, _: &Request| -> ProvideResult { Ok(Answer::Name(String::new())) };
        let result = StaticProvider::builder("dup")
            .action(RequestKind::Parser, noop)
            .action(RequestKind::Parser, noop)
            .build();
        assert!(matches!(result, Err(Error::Configuration { .. })));
    }

    #[test]
    fn test_type_dispatch_provider() {
        let base = TypeRef::named("Model");
        let user = TypeRef::new("User", [base.clone()]);
        let table = ClassDispatcher::new().with(base, Answer::Name("model parser".into()));
        let provider = TypeDispatchProvider::new("models", RequestKind::Parser, table);
        let resolver = Resolver::new(ProviderChain::new().with(provider));

        assert_eq!(resolver.resolve_name(&Request::parser(user.clone())).unwrap(), "model parser");
        assert!(resolver.resolve(&Request::serializer(user)).is_err());
        assert!(resolver.resolve(&parser_int()).is_err());
    }

    #[test]
    fn test_unexpected_answer_shape() {
        let (named, _) = Fixed::new("named");
        let resolver = Resolver::new(ProviderChain::new().with(named));
        match resolver.resolve_plan(&parser_int()) {
            Err(ResolveError::UnexpectedAnswer(err)) => {
                assert_eq!(err.expected, "plan");
                assert_eq!(err.found, "name");
            }
            other => panic!("expected UnexpectedAnswer, got {:?}", other),
        }
    }

    #[test]
    fn test_produce_converter_end_to_end() {
        let upper = Function::new("str_upper", |args| match args.single("str_upper")? {
            Value::Str(s) => Ok(Value::Str(s.to_uppercase())),
            other => Ok(other),
        });
        let plans = FnProvider::new("plans", move |_: &Mediator<'_>, _: &Request| {
            Ok(Answer::Plan(Plan::call(
                upper.clone(),
                [PlanArg::positional(Plan::attr(Plan::param("x"), "name"))],
            )))
        });
        let resolver = Resolver::new(
            ProviderChain::new().with_checked(RequestKind::Conversion, plans),
        );
        let request = ConversionRequest {
            source: TypeRef::named("User"),
            target: TypeRef::str(),
            signature: Signature::positional(["x"]).unwrap(),
        };

        let closure = resolver.produce_converter(request).unwrap();
        assert_eq!(
            closure.source(),
            "def broaching_closure(x):\n    return str_upper(x.name)\n"
        );
        let user = Value::object(Record::new("User").with_field("name", "bob"));
        assert_eq!(closure.call(CallArgs::positional([user])).unwrap(), Value::from("BOB"));
    }
}
