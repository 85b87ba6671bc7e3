use deduction::binding::*;
use deduction::expr::*;
use deduction::parsing::*;
use deduction::render::*;
use proptest::prelude::*;

macro_rules! same {
	($a:expr, $b:expr) => {
		assert!(
			structural_equals(&parse_formula($a).unwrap(), &parse_formula($b).unwrap()),
			"`{}` and `{}` should be equal",
			$a,
			$b
		);
	};
}

macro_rules! differ {
	($a:expr, $b:expr) => {
		assert!(
			!structural_equals(&parse_formula($a).unwrap(), &parse_formula($b).unwrap()),
			"`{}` and `{}` should differ",
			$a,
			$b
		);
	};
}

fn term(text: &str) -> Formula {
	parse_term(text).unwrap()
}

#[test]
fn commutativity() {
	same!("A∧B", "B∧A");
	same!("A∨B", "B∨A");
	same!("(A∧B)∨C", "C∨(B∧A)");
	differ!("A⇒B", "B⇒A");
	differ!("x+0=x", "x=x+0");
}

#[test]
fn associativity() {
	same!("A⇒B⇒C", "(A⇒B)⇒C");
	differ!("A⇒B⇒C", "A⇒(B⇒C)");
	same!("x+y+z=0", "(x+y)+z=0");
	same!("A∧B∧C", "(A∧B)∧C");
}

#[test]
fn priority() {
	same!("A∧B∨C", "(A∧B)∨C");
	same!("¬A∧B", "(¬A)∧B");
	same!("A⇒B∨C", "A⇒(B∨C)");
	same!("x+y*z=0", "x+(y*z)=0");
	same!("∀x P(x)∧A", "(∀x P(x))∧A");
}

#[test]
fn negations() {
	assert_eq!(
		parse_formula("¬¬A").unwrap(),
		Formula::Negation {
			operand: Box::new(Formula::atom("A")),
			count: 2,
		}
	);
	same!("¬¬A", "¬(¬A)");
	differ!("¬A", "¬¬A");
	same!("~!A", "¬¬A");
}

#[test]
fn no_alpha_equivalence() {
	differ!("∀x P(x)", "∀y P(y)");
	differ!("∃x Q(x)", "∃y Q(y)");
	same!("∀x.P(x)", "∀x P(x)");
}

#[test]
fn lexical_classes() {
	assert_eq!(term("x"), Formula::Variable { name: "x".to_string() });
	assert_eq!(term("y1"), Formula::Variable { name: "y1".to_string() });
	assert_eq!(term("z'"), Formula::Variable { name: "z'".to_string() });
	assert_eq!(term("c"), Formula::Constant { value: "c".to_string() });
	assert_eq!(term("xa"), Formula::Constant { value: "xa".to_string() });
	assert_eq!(term("12"), Formula::Number { value: "12".to_string() });
	assert!(matches!(term("f(x, c)"), Formula::Function { .. }));
	assert!(matches!(parse_formula("P(x, f(y))").unwrap(), Formula::Predicate { .. }));
	assert!(matches!(parse_formula("A").unwrap(), Formula::Atom { .. }));
	assert!(parse_formula("⊤").unwrap().is_top());
	assert!(parse_formula("⊥").unwrap().is_bottom());
}

#[test]
fn ascii_aliases() {
	same!("~A & B -> C | D", "¬A∧B⇒C∨D");
	same!("A => B", "A⇒B");
	same!("x != 0", "x≠0");
	differ!("x = 0", "x ≠ 0");
}

#[test]
fn successor_sugar() {
	assert_eq!(desugar_successors("s0+ss1"), "s(0)+s(s(1))");
	assert_eq!(desugar_successors("sum+s0"), "sum+s(0)");
	assert_eq!(desugar_successors("s(x)"), "s(x)");
	same!("s0=ss0", "s(0)=s(s(0))");
	differ!("s0=ss0", "s(0)=s(0)");
}

#[test]
fn sequents() {
	let (antecedent, succedent) = parse_sequent("A, B ⊢ A∧B, C").unwrap();
	assert_eq!(antecedent.len(), 2);
	assert_eq!(succedent.len(), 2);

	let (antecedent, succedent) = parse_sequent("|- A").unwrap();
	assert!(antecedent.is_empty());
	assert_eq!(succedent, vec![Formula::atom("A")]);

	let (antecedent, succedent) = parse_sequent("A⇒A").unwrap();
	assert!(antecedent.is_empty());
	assert_eq!(succedent.len(), 1);

	let sequent = parse_sequent_formula("A, B ⊢ A∧B").unwrap();
	assert!(matches!(sequent, Formula::Sequent { ref premises, .. } if premises.len() == 2));
	assert_eq!(formula_to_string(&sequent, false), "A, B ⊢ A∧B");
}

#[test]
fn parse_errors() {
	assert!(parse_formula("A∧").is_err());
	assert!(parse_formula("(A").is_err());
	assert!(parse_formula("∀ P(x)").is_err());

	let err = parse_formula("A ∧ ∧ B").unwrap_err();
	assert_eq!(err.line, 1);
	assert!(err.offset >= 4);
}

#[test]
fn strip_parens() {
	let inner = parse_formula("A∧B").unwrap();
	let wrapped = inner.clone().parenthesized().parenthesized();
	assert_eq!(wrapped.strip_parens(), inner.strip_parens());
	assert_eq!(wrapped.strip_parens().strip_parens(), wrapped.strip_parens());

	let twice = Formula::Parenthesis {
		value: Box::new(Formula::Parenthesis { value: Box::new(inner.clone()) }),
	};
	assert_eq!(twice.strip_parens(), &inner);
	assert_eq!(twice.into_stripped(), inner);
}

#[test]
fn rendering() {
	let render = |text: &str, full: bool| formula_to_string(&parse_formula(text).unwrap(), full);

	assert_eq!(render("(A∧B)⇒C", false), "A∧B⇒C");
	assert_eq!(render("A⇒(B⇒C)", false), "A⇒(B⇒C)");
	assert_eq!(render("(A⇒B)⇒C", false), "(A⇒B)⇒C");
	assert_eq!(render("¬(A∧B)", false), "¬(A∧B)");
	assert_eq!(render("∀x P(x)", false), "∀x P(x)");
	assert_eq!(render("∀x(P(x)∧Q(x))", false), "∀x(P(x)∧Q(x))");
	assert_eq!(render("x+0=x", false), "x+0=x");
	assert_eq!(render("(x+y)*z=0", false), "(x+y)*z=0");

	assert_eq!(render("A∧B⇒C", true), "(A∧B)⇒C");
	assert_eq!(render("¬A∧B", true), "(¬A)∧B");
	assert_eq!(render("∀x P(x)", true), "∀x P(x)");
	assert_eq!(render("∀x x=0", true), "∀x(x=0)");

	assert_eq!(parse_formula("A ∧ B").unwrap().to_string(), "A∧B");

	let mut sum = parse_formula("x+y=0").unwrap();
	substitute_all(&mut sum, "y", "a+b").unwrap();
	assert_eq!(sum.to_string(), "x+(a+b)=0");
	same!(&sum.to_string(), "x+(a+b)=0");
	differ!(&sum.to_string(), "x+a+b=0");
	assert_eq!(render("A∧(B∧C)", false), "A∧(B∧C)");
	assert_eq!(render("A∧B∧C", false), "A∧B∧C");
}

#[test]
fn logical_expression() {
	let convert = |text: &str| convert_to_logical_expression(&parse_formula(text).unwrap());

	assert_eq!(convert("∀x P(x)"), "∀x(P(x))");
	assert_eq!(convert("(A)∧(B)"), "(A)∧(B)");
	assert_eq!(convert("A∧B"), "A∧B");
	assert_eq!(convert_to_logical_expression(&Formula::conjunction(Formula::atom("A"), Formula::atom("B"))), "(A)∧(B)");

	let text = convert("∀x∃y(x+s(y)=s(x+y))");
	same!(&text, "∀x∃y(x+s(y)=s(x+y))");
}

#[test]
fn substitution() {
	let mut sum = term("x+x");
	assert_eq!(substitute_all(&mut sum, "x", "0").unwrap(), 2);
	assert!(structural_equals(&sum, &term("0+0")));

	let mut sum = term("x+x");
	assert_eq!(substitute_first(&mut sum, "x", "0").unwrap(), 1);
	assert!(structural_equals(&sum, &term("0+x")));

	let mut formula = parse_formula("P(x)∧Q(y)").unwrap();
	assert_eq!(substitute_first(&mut formula, "y", "c").unwrap(), 1);
	same!(&formula.to_string(), "P(x)∧Q(c)");
	assert_eq!(substitute_first(&mut formula, "z", "c").unwrap(), 0);

	let mut formula = parse_formula("f(x)=y").unwrap();
	assert_eq!(substitute_all(&mut formula, "f( x )", "c").unwrap(), 1);
	same!(&formula.to_string(), "c=y");

	let mut formula = parse_formula("s(x)=s(0)").unwrap();
	assert_eq!(substitute_all(&mut formula, "s(0)", "ss0").unwrap(), 1);
	same!(&formula.to_string(), "s(x)=s(s(0))");

	let mut formula = parse_formula("A⇒B").unwrap();
	assert_eq!(substitute_all(&mut formula, "A", "C∧D").unwrap(), 1);
	same!(&formula.to_string(), "(C∧D)⇒B");

	let mut formula = parse_formula("A").unwrap();
	assert!(substitute_all(&mut formula, "A", "∧").is_err());
}

#[test]
fn instantiation() {
	let body = parse_formula("P(x)∧Q(x, y)").unwrap();
	let instance = instantiate(&body, "x", "c").unwrap();
	same!(&instance.to_string(), "P(c)∧Q(c, y)");
	same!(&body.to_string(), "P(x)∧Q(x, y)");

	let twice = parse_formula("P(x, x)").unwrap();
	same!(&instantiate(&twice, "x", "c").unwrap().to_string(), "P(c, c)");

	let shadowed = parse_formula("P(x)∧∃x Q(x)").unwrap();
	same!(&instantiate(&shadowed, "x", "c").unwrap().to_string(), "P(c)∧∃x Q(x)");
	let inner = parse_formula("∀y R(x, y)∧∀x R(x, x)").unwrap();
	same!(&instantiate(&inner, "x", "c").unwrap().to_string(), "∀y R(c, y)∧∀x R(x, x)");

	let mut plain = shadowed.clone();
	assert_eq!(substitute_all(&mut plain, "x", "c").unwrap(), 2);

	assert_eq!(Substitution::new("x", " c ").to_string(), "x/c");
}

#[test]
fn extraction() {
	let extract = |text: &str| extract_constants_or_variables(&parse_formula(text).unwrap());

	assert_eq!(extract("∀x P(f(x), c)"), vec!["P(f(x),c)", "f(x)", "x", "c"]);
	assert_eq!(extract("A∧⊤"), vec!["A"]);
	assert_eq!(extract("x+x=x"), vec!["x"]);
	assert_eq!(extract("s(0)=1"), vec!["s(0)", "0", "1"]);

	let context = vec![parse_formula("P(c)").unwrap()];
	assert!(occurs_in("c", &context));
	assert!(!occurs_in("d", &context));
	assert!(occurs_in("P( c )", &context));
}

fn formula_text() -> impl Strategy<Value = String> {
	let leaf = prop_oneof![
		Just("A".to_string()),
		Just("B".to_string()),
		Just("⊤".to_string()),
		Just("⊥".to_string()),
		Just("P(x)".to_string()),
		Just("Q(x, c)".to_string()),
		Just("x=s(0)".to_string()),
		Just("x+y*z≠0".to_string()),
	];

	leaf.prop_recursive(4, 32, 2, |inner| {
		prop_oneof![
			(inner.clone(), inner.clone()).prop_map(|(a, b)| format!("({})∧({})", a, b)),
			(inner.clone(), inner.clone()).prop_map(|(a, b)| format!("({})∨({})", a, b)),
			(inner.clone(), inner.clone()).prop_map(|(a, b)| format!("({})⇒({})", a, b)),
			(inner.clone(), inner.clone()).prop_map(|(a, b)| format!("{}∧{}", a, b)),
			(inner.clone(), inner.clone()).prop_map(|(a, b)| format!("{}⇒{}", a, b)),
			inner.clone().prop_map(|a| format!("¬({})", a)),
			inner.clone().prop_map(|a| format!("¬{}", a)),
			inner.clone().prop_map(|a| format!("∀x({})", a)),
			inner.clone().prop_map(|a| format!("∃y({})", a)),
		]
	})
}

proptest! {
	#[test]
	fn full_parens_round_trip(text in formula_text()) {
		let formula = parse_formula(&text).unwrap();
		let printed = formula_to_string(&formula, true);
		let reparsed = parse_formula(&printed).unwrap();
		prop_assert!(structural_equals(&formula, &reparsed), "`{}` printed as `{}`", text, printed);
	}

	#[test]
	fn minimal_parens_round_trip(text in formula_text()) {
		let formula = parse_formula(&text).unwrap();
		let printed = formula_to_string(&formula, false);
		let reparsed = parse_formula(&printed).unwrap();
		prop_assert!(structural_equals(&formula, &reparsed), "`{}` printed as `{}`", text, printed);
	}

	#[test]
	fn structural_equality_is_symmetric(a in formula_text(), b in formula_text()) {
		let a = parse_formula(&a).unwrap();
		let b = parse_formula(&b).unwrap();
		prop_assert_eq!(structural_equals(&a, &b), structural_equals(&b, &a));
		prop_assert!(structural_equals(&a, &a));
	}

	#[test]
	fn stripping_is_idempotent(text in formula_text()) {
		let formula = parse_formula(&text).unwrap();
		let wrapped = Formula::Parenthesis { value: Box::new(formula.clone().parenthesized()) };
		prop_assert_eq!(wrapped.strip_parens(), formula.strip_parens());
	}
}
