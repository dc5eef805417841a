use dcommon::Intern;

use super::*;
use crate::{
    basic::*,
    result::CheckError,
    signature::ParameterSet,
    sort::{Level, Sort},
    syntax::{DataDefinition, Expr},
    term::*,
    test_support::*,
};

const NAT: &str = r#"Data((
    name: "Nat",
    ty: Some(Set(0)),
    constructors: [
        (name: "zero", ty: Const("Nat")),
        (name: "suc", ty: Arrow(Const("Nat"), Const("Nat"))),
    ],
))"#;

const VEC: &str = r#"Data((
    name: "Vec",
    ty: Some(Pi((name: "A", ty: Set(0)), Arrow(Const("Nat"), Set(0)))),
    parameters: [(name: "A")],
    constructors: [
        (name: "nil", ty: App(Const("Vec"), [Explicit(Var("A")), Explicit(Const("zero"))])),
        (name: "cons", ty: Pi(
            (name: "n", ty: Const("Nat"), annotation: Implicit),
            Arrow(
                Var("A"),
                Arrow(
                    App(Const("Vec"), [Explicit(Var("A")), Explicit(Var("n"))]),
                    App(Const("Vec"), [
                        Explicit(Var("A")),
                        Explicit(App(Const("suc"), [Explicit(Var("n"))])),
                    ]),
                ),
            ),
        )),
    ],
))"#;

const ID: &str = r#"Data((
    name: "Id",
    ty: Some(Pi((name: "A", ty: Set(0)), Pi((name: "a", ty: Var("A")), Arrow(Var("A"), Set(0))))),
    parameters: [(name: "A"), (name: "a")],
    constructors: [
        (name: "refl", ty: App(Const("Id"), [Explicit(Var("A")), Explicit(Var("a")), Explicit(Var("a"))])),
    ],
))"#;

fn module(options: &str, declarations: &[&str]) -> String {
    format!(
        "(options: ({}), declarations: [{}])",
        options,
        declarations.join(", ")
    )
}

fn data(text: &str) -> DataDefinition {
    ron::from_str(text).unwrap()
}

fn expr(text: &str) -> Expr {
    ron::from_str(text).unwrap()
}

fn find<'a>(db: &dyn Intern, certified: &'a [CertifiedDatatype], name: &str) -> &'a CertifiedDatatype {
    certified
        .iter()
        .find(|datatype| datatype.name.display(db) == name)
        .unwrap()
}

fn set(positions: &[u32]) -> ParameterSet {
    positions.iter().copied().collect()
}

#[test]
fn nullary_constructors() {
    with_module(&module("", &[NAT]), |tcm, result| {
        let db = tcm.db();
        let certified = result.unwrap();
        let nat = find(db, &certified, "Nat");
        assert_eq!(nat.definition.parameters, 0);
        assert_eq!(nat.definition.indices, 0);
        assert_eq!(nat.definition.sort, Sort::type_n(0));
        assert!(nat.definition.non_linear_parameters.is_empty());
        let arities = nat
            .constructors
            .iter()
            .map(|(_, constructor)| constructor.arity)
            .collect::<Vec<_>>();
        assert_eq!(arities, vec![0, 1]);
        assert!(!tcm.state.signature.is_placeholder(nat.name));
    });
}

#[test]
fn vectors_force_their_length() {
    with_module(&module("", &[NAT, VEC]), |tcm, result| {
        let db = tcm.db();
        let certified = result.unwrap();
        let vec = find(db, &certified, "Vec");
        assert_eq!(vec.definition.parameters, 1);
        assert_eq!(vec.definition.indices, 1);
        assert!(vec.definition.non_linear_parameters.is_empty());
        assert!(vec.definition.small_parameters.is_empty());

        let (cons, definition) = &vec.constructors[1];
        assert_eq!(definition.arity, 3);
        assert_eq!(definition.parameters, 1);
        assert_eq!(
            definition.forced,
            vec![IsForced::Forced, IsForced::NotForced, IsForced::NotForced]
        );

        // Outside the datatype, the parameter becomes an implicit argument.
        let ty = &tcm.state.signature.get(*cons).unwrap().ty;
        let (telescope, _) = tcm.telescope_view(ty);
        assert_eq!(telescope.len(), 4);
        assert_eq!(
            telescope.domains()[0].info.annotation,
            BinderAnnotation::Implicit
        );
        assert_eq!(
            tcm.state.signature.datatype(vec.name).unwrap().constructors,
            vec.definition.constructors
        );
    });
}

#[test]
fn forcing_can_be_disabled() {
    with_module(&module("forcing: false", &[NAT, VEC]), |tcm, result| {
        let certified = result.unwrap();
        let vec = find(tcm.db(), &certified, "Vec");
        assert_eq!(vec.constructors[1].1.forced, vec![IsForced::NotForced; 3]);
    });
}

/// Forces every argument, whether or not it can be recovered from the target.
struct ForceEverything;

impl crate::forcing::ForcingAnalysis for ForceEverything {
    fn forced_arguments(
        &self,
        state: &crate::state::State,
        conversion: &dyn crate::conversion::Conversion,
        ty: &Type,
        _parameters: usize,
    ) -> Vec<IsForced> {
        let mut forced = Vec::new();
        let mut current = conversion.reduce(state, &ty.term);
        while let Term::Pi(pi) = current {
            forced.push(IsForced::Forced);
            current = conversion.reduce(state, &pi.codomain.term);
        }
        forced
    }
}

#[test]
fn forcing_analysis_can_be_replaced() {
    let module = crate::syntax::Module::from_ron(&module("", &[NAT, VEC])).unwrap();
    with_db(|db| {
        let mut tcm = Tcm::new(db, module.options.clone())
            .with_conversion(crate::conversion::Unifier)
            .with_forcing(ForceEverything);
        let certified = crate::check_module(&mut tcm, &module).unwrap();
        let nat = find(db, &certified, "Nat");
        assert_eq!(nat.constructors[1].1.forced, vec![IsForced::Forced]);
        // Forced arguments are exempt from the containment check, but still count towards the arity.
        let vec = find(db, &certified, "Vec");
        assert_eq!(vec.constructors[1].1.arity, 3);
        assert_eq!(vec.constructors[1].1.forced, vec![IsForced::Forced; 3]);
    });
}

#[test]
fn repeated_parameters_are_non_linear() {
    with_module(&module("", &[ID]), |tcm, result| {
        let certified = result.unwrap();
        let id = find(tcm.db(), &certified, "Id");
        assert_eq!(id.definition.parameters, 2);
        assert_eq!(id.definition.non_linear_parameters, set(&[1]));
        assert_eq!(id.definition.small_parameters, set(&[1]));
        assert_eq!(id.constructors[0].1.arity, 0);
    });
}

/// What checking computes about a datatype, without the interned names.
type Shape = (ParameterSet, ParameterSet, Vec<(u32, Vec<IsForced>)>);

fn shapes(certified: &[CertifiedDatatype]) -> Vec<Shape> {
    certified
        .iter()
        .map(|datatype| {
            (
                datatype.definition.small_parameters.clone(),
                datatype.definition.non_linear_parameters.clone(),
                datatype
                    .constructors
                    .iter()
                    .map(|(_, constructor)| (constructor.arity, constructor.forced.clone()))
                    .collect(),
            )
        })
        .collect()
}

#[test]
fn checking_again_gives_the_same_results() {
    let text = module("", &[NAT, VEC, ID]);
    let first = with_module(&text, |_, result| shapes(&result.unwrap()));
    let second = with_module(&text, |_, result| shapes(&result.unwrap()));
    assert_eq!(first, second);
    assert_eq!(first[1].2[1].0, 3);
    assert_eq!(first[2].1, set(&[1]));
}

#[test]
fn unsolved_placeholders_are_reported() {
    let d = r#"Data((
        name: "D",
        ty: Some(Arrow(Const("Nat"), Set(0))),
        constructors: [(name: "mk", ty: Pi((name: "n", ty: Const("Nat")), Hole))],
    ))"#;
    with_module(&module("", &[NAT, d]), |tcm, result| {
        assert!(!result.errored());
        let warning = result
            .reports()
            .iter()
            .find(|report| report.code.as_deref() == Some("unsolved-placeholders"))
            .unwrap();
        assert!(warning.message.as_deref().unwrap().contains("mk"));
        assert!(tcm
            .state
            .signature
            .constructor(QualifiedName::new(tcm.db(), "mk"))
            .is_some());
    });
    with_module(&module("", &[NAT, VEC]), |_, result| {
        assert!(result.reports().is_empty());
    });
}

#[test]
fn levels_are_never_small() {
    let wrap = r#"Data((
        name: "W",
        ty: Some(Pi((name: "A", ty: Set(0)), Pi((name: "n", ty: Const("Nat")), Pi((name: "l", ty: Const("Level")), Set(0))))),
        parameters: [(name: "A"), (name: "n"), (name: "l")],
    ))"#;
    with_module(&module("", &[NAT, wrap]), |tcm, result| {
        let certified = result.unwrap();
        let wrap = find(tcm.db(), &certified, "W");
        assert_eq!(wrap.definition.small_parameters, set(&[1]));
        assert!(tcm.state.constraints.is_empty());
    });
}

#[test]
fn sorts_may_not_depend_on_indices() {
    with_tcm(|tcm| {
        let result = check_data_definition(
            tcm,
            &data(r#"(name: "D", ty: Some(Pi((name: "l", ty: Const("Level")), SetAt(Var("l")))))"#),
        );
        let name = QualifiedName::new(tcm.db(), "D");
        assert_eq!(
            result,
            Err(CheckError::SortDependsOnIndices { datatype: name })
        );
        assert!(tcm.state.signature.get(name).is_none());
    });
}

#[test]
fn sorts_may_depend_on_parameters() {
    let lift = r#"Data((
        name: "Lift",
        ty: Some(Pi((name: "l", ty: Const("Level")), SetAt(Var("l")))),
        parameters: [(name: "l")],
    ))"#;
    with_module(&module("", &[lift]), |tcm, result| {
        let certified = result.unwrap();
        let lift = find(tcm.db(), &certified, "Lift");
        assert_eq!(
            lift.definition.sort,
            Sort::Type(Level::atom(Term::local(0)))
        );
    });
}

#[test]
fn datatypes_must_end_in_a_sort() {
    with_module(&module("", &[NAT]), |tcm, result| {
        result.assert_ok();
        let error = check_data_definition(
            tcm,
            &data(r#"(name: "D", ty: Some(Arrow(Const("Nat"), Const("Nat"))))"#),
        )
        .unwrap_err();
        assert!(matches!(error, CheckError::Conversion(_)), "{:?}", error);
    });
}

#[test]
fn irrelevant_constructors_are_rejected() {
    with_tcm(|tcm| {
        let result = check_data_definition(
            tcm,
            &data(
                r#"(name: "D", ty: Some(Set(0)), constructors: [(name: "d", ty: Const("D"), relevance: Irrelevant)])"#,
            ),
        );
        assert_eq!(result.unwrap_err().code(), "irrelevant-constructor");
    });
}

#[test]
fn constructors_must_target_their_datatype() {
    with_module(&module("", &[NAT]), |tcm, result| {
        result.assert_ok();
        let error = check_data_definition(
            tcm,
            &data(r#"(name: "B", ty: Some(Set(0)), constructors: [(name: "b", ty: Const("Nat"))])"#),
        )
        .unwrap_err();
        let nat = QualifiedName::new(tcm.db(), "Nat");
        assert_eq!(
            error,
            CheckError::ConstructorTargetMismatch {
                constructor: QualifiedName::new(tcm.db(), "b"),
                target: Term::Inst(nat),
            }
        );
    });
}

#[test]
fn parameters_must_be_passed_unchanged() {
    let bad = r#"Data((
        name: "L",
        ty: Some(Pi((name: "A", ty: Set(0)), Set(0))),
        parameters: [(name: "A")],
        constructors: [(name: "c", ty: App(Const("L"), [Explicit(Const("Nat"))]))],
    ))"#;
    with_module(&module("", &[NAT, bad]), |_, result| {
        assert_eq!(result.reports().len(), 1);
        assert_eq!(result.reports()[0].code.as_deref(), Some("conversion"));
    });
}

#[test]
fn placeholder_targets_are_solved() {
    let unit = r#"Data((name: "Unit", ty: Some(Set(0)), constructors: [(name: "tt", ty: Hole)]))"#;
    with_module(&module("", &[unit]), |tcm, result| {
        let certified = result.unwrap();
        let unit = find(tcm.db(), &certified, "Unit");
        let tt = unit.constructors[0].0;
        let ty = &tcm.state.signature.get(tt).unwrap().ty;
        assert_eq!(tcm.normalise(&ty.term), Term::Inst(unit.name));
    });
}

#[test]
fn implicit_parameters_are_inserted() {
    let signature = r#"DataSignature(
        name: "P",
        ty: Pi((name: "A", ty: Set(0), annotation: Implicit), Pi((name: "x", ty: Var("A")), Set(0))),
    )"#;
    let definition = r#"Data((
        name: "P",
        parameters: [(name: "x")],
        constructors: [(name: "mk", ty: App(Const("P"), [Implicit(Var("A")), Explicit(Var("x"))]))],
    ))"#;
    with_module(&module("", &[signature, definition]), |tcm, result| {
        let certified = result.unwrap();
        let p = find(tcm.db(), &certified, "P");
        assert_eq!(p.definition.parameters, 2);
        assert_eq!(p.definition.indices, 0);
        assert_eq!(p.constructors[0].1.parameters, 2);
    });
}

#[test]
fn ascriptions_must_agree_with_the_signature() {
    let signature = r#"DataSignature(name: "Q", ty: Pi((name: "A", ty: Set(0)), Set(0)))"#;
    let definition = r#"Data((name: "Q", parameters: [(name: "A", ty: Some(Set(1)))]))"#;
    with_module(&module("", &[signature, definition]), |_, result| {
        assert_eq!(result.reports()[0].code.as_deref(), Some("conversion"));
    });
}

#[test]
fn data_without_signature() {
    with_tcm(|tcm| {
        let error = check_data_definition(tcm, &data(r#"(name: "D")"#)).unwrap_err();
        assert_eq!(error.code(), "missing-data-signature");
    });
}

#[test]
fn propositions_must_be_singletons() {
    let two = r#"Data((name: "Two", ty: Some(Prop), constructors: [(name: "a", ty: Const("Two")), (name: "b", ty: Const("Two"))]))"#;
    let one = r#"Data((name: "One", ty: Some(Prop), constructors: [(name: "it", ty: Const("One"))]))"#;
    with_module(&module("prop_singleton: true", &[two, one]), |tcm, result| {
        assert_eq!(
            result.reports()[0].code.as_deref(),
            Some("prop-must-be-singleton")
        );
        let certified = result.value().as_ref().unwrap();
        assert_eq!(certified.len(), 1);
        assert!(tcm
            .state
            .signature
            .get(QualifiedName::new(tcm.db(), "a"))
            .is_none());
    });
    with_module(&module("", &[two]), |_, result| {
        result.assert_ok();
    });
}

#[test]
fn arguments_must_fit_in_the_datatype() {
    let big = r#"(name: "Big", ty: Some(Set(0)), constructors: [(name: "big", ty: Arrow(Set(0), Const("Big")))])"#;
    with_tcm(|tcm| {
        let error = check_data_definition(tcm, &data(big)).unwrap_err();
        match error {
            CheckError::SortContainment { argument, .. } => assert_eq!(argument, Some(0)),
            other => panic!("expected a sort containment error, found {:?}", other),
        }
    });
    let unchecked = r#"Data((name: "Big", ty: Some(Set(0)), universe_check: false, constructors: [(name: "big", ty: Arrow(Set(0), Const("Big")))]))"#;
    with_module(&module("", &[unchecked]), |tcm, result| {
        let certified = result.unwrap();
        let big = find(tcm.db(), &certified, "Big");
        assert!(!big.definition.universe_check);
        assert_eq!(big.constructors[0].1.arity, 1);
    });
}

#[test]
fn sizes_always_fit() {
    let sized = r#"Data((name: "S", ty: Some(Set(0)), constructors: [(name: "s", ty: Arrow(Const("Size"), Const("S")))]))"#;
    with_module(&module("", &[sized]), |_, result| {
        result.assert_ok();
    });
}

#[test]
fn without_k_bounds_index_sorts() {
    let family = r#"Data((name: "F", ty: Some(Arrow(Set(0), Set(0)))))"#;
    with_module(&module("without_k: true", &[family]), |_, result| {
        assert_eq!(
            result.reports()[0].code.as_deref(),
            Some("index-sort-too-large")
        );
    });
    with_module(&module("", &[family]), |_, result| {
        result.assert_ok();
    });
}

#[test]
fn failed_datatypes_are_rolled_back() {
    let bad = r#"Data((
        name: "B",
        ty: Some(Set(0)),
        constructors: [(name: "t", ty: Const("B")), (name: "f", ty: Const("Nat"))],
    ))"#;
    let good = r#"Data((name: "B", ty: Some(Set(0)), constructors: [(name: "t", ty: Const("B"))]))"#;
    with_module(&module("", &[NAT, bad, good]), |tcm, result| {
        assert_eq!(result.reports().len(), 1);
        let certified = result.value().as_ref().unwrap();
        let b = find(tcm.db(), certified, "B");
        assert_eq!(b.constructors.len(), 1);
        assert!(tcm
            .state
            .signature
            .get(QualifiedName::new(tcm.db(), "f"))
            .is_none());
    });
}

#[test]
fn instance_constructors_are_recorded() {
    let d = r#"Data((name: "D", ty: Some(Set(0)), constructors: [(name: "d", ty: Const("D"), instance: true)]))"#;
    with_module(&module("", &[d]), |tcm, result| {
        result.assert_ok();
        let db = tcm.db();
        let instances = tcm
            .state
            .instances_of(QualifiedName::new(db, "D"))
            .copied()
            .collect::<Vec<_>>();
        assert_eq!(instances, vec![QualifiedName::new(db, "d")]);
    });
}

#[test]
fn coinduction_is_read_off_the_head() {
    let declarations = [
        r#"Postulate(name: "A", ty: Set(0))"#,
        r#"Function(name: "F", ty: Set(0))"#,
        r#"Function(name: "Id", ty: Arrow(Set(0), Set(0)), parameters: ["X"], body: Some(Var("X")))"#,
        r#"Record(name: "Stream", ty: Arrow(Set(0), Set(0)), induction: Some(CoInductive))"#,
        r#"Record(name: "Pair", ty: Set(0))"#,
        r#"Data((name: "Colist", ty: Some(Set(0)), induction: CoInductive, constructors: [(name: "end", ty: Const("Colist"))]))"#,
    ];
    with_module(&module("", &declarations), |tcm, result| {
        result.assert_ok();
        let cases = [
            (r#"Const("A")"#, Some(false)),
            (r#"Const("F")"#, None),
            (r#"App(Const("Stream"), [Explicit(Const("A"))])"#, Some(true)),
            (
                r#"App(Const("Id"), [Explicit(App(Const("Stream"), [Explicit(Const("A"))]))])"#,
                Some(true),
            ),
            (r#"Const("Pair")"#, Some(false)),
            (r#"Const("Colist")"#, Some(true)),
            (r#"Arrow(Const("A"), Const("A"))"#, Some(false)),
            (r#"Set(0)"#, Some(false)),
        ];
        for (text, expected) in cases {
            let ty = tcm.elaborate_type(&expr(text)).unwrap();
            assert_eq!(is_coinductive(tcm, &ty), expected, "{}", text);
        }
        // A variable has no declared induction.
        let variable = Type::new(Sort::type_n(0), Term::local(0));
        assert_eq!(is_coinductive(tcm, &variable), None);
    });
}
