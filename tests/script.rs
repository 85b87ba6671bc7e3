use deduction::proof::RuleError;
use deduction::read_script;
use deduction::script::*;
use deduction::sequent::Side;

const DEMO: &str = include_str!("../proofs/demo.proof");

fn error(input: &str) -> ScriptError {
	match execute(input) {
		Err(err) => err.inner,
		Ok(_) => panic!("`{}` must fail", input),
	}
}

#[test]
fn demo_runs() {
	assert_eq!(read_script(DEMO), Ok(()));
	let session = execute(DEMO).unwrap().unwrap();
	assert_eq!(session.calculus(), CalculusKind::Sequent);
	assert!(session.is_finished());
}

#[test]
fn commands() {
	let input = "# comment\n\nproof sequent A, B ⊢ A\nselect node 0.1.2\n  select right 2 # second\napply ∀E: ∀x P(x); c\nselect lines 1, 2 3\nundo\n";
	let commands: Vec<Command> = parse_script(input).unwrap().into_iter().map(|c| c.inner).collect();
	assert_eq!(
		commands,
		vec![
			Command::Proof {
				calculus: CalculusKind::Sequent,
				sequent: "A, B ⊢ A".to_string(),
			},
			Command::SelectNode(vec![0, 1, 2]),
			Command::SelectFormula { side: Side::Right, index: 2 },
			Command::Apply {
				rule: "∀E".to_string(),
				answers: vec!["∀x P(x)".to_string(), "c".to_string()],
			},
			Command::SelectLines(vec![1, 2, 3]),
			Command::Undo,
		]
	);
}

#[test]
fn syntax_error_points_at_line() {
	let input = "proof fitch A ⊢ A\nfrobnicate\n";
	let err = parse_script(input).unwrap_err();
	assert!(matches!(err.inner, ScriptError::Syntax(_)));
	assert_eq!(err.span.0.start, "proof fitch A ⊢ A\n".len());

	let snippet = err.error_snippet(input, false);
	assert!(snippet.contains("frobnicate"));
	assert!(snippet.contains("unknown command"));
	assert!(snippet.contains('2'));
}

#[test]
fn errors() {
	assert!(matches!(error("select line 1\n"), ScriptError::NoProof));
	assert!(matches!(error("proof fitch A ⊢ A∧B\ndone\n"), ScriptError::Unfinished));
	assert!(matches!(
		error("proof gentzen ⊢ A\nassume B\n"),
		ScriptError::Unsupported { command: "assume", calculus: CalculusKind::Gentzen }
	));
	assert!(matches!(
		error("proof fitch ⊢ A, B\n"),
		ScriptError::SingleGoal { calculus: CalculusKind::Fitch }
	));
	assert!(matches!(error("proof fitch A ⊢ A\nselect line 0\n"), ScriptError::ZeroIndex));
	assert!(matches!(error("proof fitch A ⊢ A∧\n"), ScriptError::Formula(_)));
	assert!(matches!(
		error("proof fitch A ⊢ A\napply ⊥E2\n"),
		ScriptError::Rule(RuleError::UnknownRule(_))
	));
	assert!(matches!(
		error("proof sequent A ⊢ B\napply id\n"),
		ScriptError::Rule(RuleError::Inapplicable { .. })
	));
	assert!(matches!(
		error("proof sequent A ⊢ B\nselect node 1\n"),
		ScriptError::Rule(RuleError::InvalidSelection(_))
	));
}

#[test]
fn error_span_covers_command() {
	let input = "proof fitch A ⊢ B\n  done\n";
	let err = execute(input).err().unwrap();
	assert!(matches!(err.inner, ScriptError::Unfinished));
	let start = input.find("done").unwrap();
	assert_eq!(err.span.0, start..start + "done".len());
}

#[test]
fn cancelled_rule_does_not_stop_script() {
	let input = "proof fitch A ⊢ A∨B\nselect line 1\napply ∨I\nselect line 1\napply ∨I: B\ndone\n";
	let session = execute(input).unwrap().unwrap();
	assert!(session.is_finished());
}

#[test]
fn gentzen_rules_by_number() {
	let input = "proof gentzen A, B ⊢ A∧B\napply 1\nselect node 1\napply close\nselect node 2\napply close\ndone\n";
	assert!(execute(input).unwrap().unwrap().is_finished());
	assert!(matches!(
		error("proof gentzen ⊢ A\napply 21\n"),
		ScriptError::Rule(RuleError::UnknownRule(_))
	));
}

#[test]
fn undo_and_redo() {
	let input = "proof fitch A, B ⊢ A∧B\nselect line 1 2\napply ∧I\nundo\nredo\nredo\ndone\n";
	assert!(execute(input).unwrap().unwrap().is_finished());

	let input = "proof fitch A, B ⊢ A∧B\nselect line 1 2\napply ∧I\nundo\ndone\n";
	assert!(matches!(error(input), ScriptError::Unfinished));
}

#[test]
fn later_proof_replaces_earlier() {
	let input = "proof fitch A ⊢ B\nproof sequent A ⊢ A\napply id\n";
	let session = execute(input).unwrap().unwrap();
	assert_eq!(session.calculus(), CalculusKind::Sequent);
	assert!(session.is_finished());
	assert!(session.to_string().contains("✓"));
}
