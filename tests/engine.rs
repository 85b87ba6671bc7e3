use deduction::fitch::*;
use deduction::history::History;
use deduction::parsing::*;
use deduction::proof::*;

fn engine() -> Engine<FitchProof> {
	let premises = vec![parse_formula("A").unwrap(), parse_formula("B").unwrap()];
	Engine::new(FitchProof::new(premises, parse_formula("A∧B").unwrap())).unwrap()
}

fn select(engine: &mut Engine<FitchProof>, lines: &[usize]) {
	engine.select(|proof| lines.iter().try_for_each(|&line| proof.select_line(line))).unwrap();
}

#[test]
fn history_truncates_redo_tail() {
	let mut history = History::new("0".to_string());
	history.checkpoint("1".to_string());
	history.checkpoint("2".to_string());
	assert_eq!(history.len(), 3);

	assert_eq!(history.undo(), Some("1"));
	assert_eq!(history.undo(), Some("0"));
	assert_eq!(history.undo(), None);
	assert_eq!(history.redo(), Some("1"));

	history.checkpoint("3".to_string());
	assert_eq!(history.len(), 3);
	assert_eq!(history.current(), "3");
	assert_eq!(history.redo(), None);
	assert_eq!(history.position(), 2);
}

#[test]
fn undo_and_redo() {
	let mut engine = engine();
	let initial = engine.snapshot().unwrap();

	select(&mut engine, &[0, 1]);
	engine.run(FitchRule::AndIntro, &mut ScriptedPrompt::default()).unwrap();
	let applied = engine.snapshot().unwrap();
	assert_eq!(engine.history().len(), 2);

	assert!(engine.undo().unwrap());
	assert_eq!(engine.snapshot().unwrap(), initial);
	assert_eq!(engine.state().lines().len(), 2);
	assert!(!engine.undo().unwrap());

	assert!(engine.redo().unwrap());
	assert_eq!(engine.snapshot().unwrap(), applied);
	assert!(!engine.redo().unwrap());
}

#[test]
fn selection_is_not_history() {
	let mut engine = engine();
	select(&mut engine, &[0]);
	assert_eq!(engine.history().len(), 1);
	assert_eq!(engine.state().selection().lines, vec![0]);

	select(&mut engine, &[0]);
	assert!(engine.state().selection().lines.is_empty());
}

#[test]
fn pending_rule_blocks_everything_else() {
	let mut engine = engine();
	select(&mut engine, &[0]);

	let request = match engine.invoke(FitchRule::OrIntro).unwrap() {
		Invocation::NeedsInput(request) => request,
		Invocation::Applied => panic!("∨I must ask for the other disjunct"),
	};
	assert_eq!(request, InputRequest::terms("∨I", &["other disjunct"]));
	assert_eq!(engine.pending(), Some(FitchRule::OrIntro));

	assert!(matches!(engine.invoke(FitchRule::Reiteration), Err(RuleError::Busy)));
	assert!(matches!(engine.select(|proof| proof.select_line(1)), Err(RuleError::Busy)));
	assert!(matches!(engine.act(|proof| proof.close_branch()), Err(RuleError::Busy)));
	assert!(matches!(engine.undo(), Err(RuleError::Busy)));

	engine.respond(InputResponse::Terms(vec!["C".to_string()])).unwrap();
	assert_eq!(engine.pending(), None);
	assert_eq!(engine.state().lines().len(), 3);
	assert!(matches!(
		engine.respond(InputResponse::Terms(vec!["C".to_string()])),
		Err(RuleError::NothingPending)
	));
}

#[test]
fn bad_input_is_rejected_cleanly() {
	let mut engine = engine();
	select(&mut engine, &[0]);
	let before = engine.snapshot().unwrap();

	let result = engine.run(FitchRule::OrIntro, &mut ScriptedPrompt::new(vec!["C ∧"]));
	assert!(matches!(result, Err(RuleError::Parse(_))));
	assert_eq!(engine.state().lines().len(), 2);
	assert_eq!(engine.history().len(), 1);
	assert_eq!(engine.pending(), None);
	assert!(engine.state().selection().lines.is_empty());
	assert_ne!(engine.snapshot().unwrap(), before);
}

#[test]
fn wrong_response_kind() {
	let mut engine = engine();
	select(&mut engine, &[0]);
	engine.invoke(FitchRule::OrIntro).unwrap();
	assert!(matches!(engine.respond(InputResponse::Choice(0)), Err(RuleError::InvalidInput(_))));
	assert_eq!(engine.pending(), None);
}

#[test]
fn snapshots_restore() {
	let mut engine = engine();
	select(&mut engine, &[0, 1]);
	engine.run(FitchRule::AndIntro, &mut ScriptedPrompt::default()).unwrap();

	let snapshot = engine.snapshot().unwrap();
	let restored = Engine::<FitchProof>::from_snapshot(&snapshot).unwrap();
	assert_eq!(restored.state(), engine.state());
	assert_eq!(restored.snapshot().unwrap(), snapshot);

	assert!(matches!(Engine::<FitchProof>::from_snapshot("{"), Err(RuleError::Snapshot(_))));
}

#[test]
fn scripted_prompt() {
	let mut prompt = ScriptedPrompt::new(vec!["2", "right", "3, 1, 2"]);
	let options = vec!["left".to_string(), "right".to_string()];
	assert_eq!(prompt.prompt_choice("∧E", &options), Ok("right".to_string()));
	assert_eq!(prompt.prompt_choice("∧E", &options), Ok("right".to_string()));

	let items = vec!["A".to_string(), "B".to_string(), "C".to_string()];
	assert_eq!(
		prompt.prompt_reorder(&items),
		Ok(vec!["C".to_string(), "A".to_string(), "B".to_string()])
	);
	assert_eq!(prompt.remaining(), 0);
	assert_eq!(prompt.prompt_term("∃I", "term"), Err(Cancelled));

	let request = InputRequest::Reorder { items };
	let mut prompt = ScriptedPrompt::new(vec!["2,1,3"]);
	assert_eq!(request.ask(&mut prompt).unwrap(), InputResponse::Reorder(vec![1, 0, 2]));
}
