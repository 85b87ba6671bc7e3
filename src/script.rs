//! Построчные сценарии доказательств: команда на строку, `#` начинает комментарий.
//!
//! ```text
//! proof fitch A, B ⊢ A∧B
//! select line 1 2
//! apply ∧I
//! done
//! ```

use crate::fitch::FitchProof;
use crate::gentzen::{GentzenProof, GentzenRule};
use crate::expr::Formula;
use crate::parsing::{parse_formula, parse_sequent, ParseError};
use crate::proof::*;
use crate::sequent::{SequentProof, Side};
use crate::utils::span::{GlobalSpan, LocalSpan, Spanned};
use colored::Colorize;
use std::fmt;
use thiserror::Error;
use tracing::debug;

#[derive(Clone, Copy, Debug, Eq, PartialEq)]
pub enum CalculusKind {
	Fitch,
	Gentzen,
	Sequent,
}

impl fmt::Display for CalculusKind {
	fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
		match self {
			CalculusKind::Fitch => write!(f, "fitch"),
			CalculusKind::Gentzen => write!(f, "gentzen"),
			CalculusKind::Sequent => write!(f, "sequent"),
		}
	}
}

#[derive(Clone, Debug, Eq, PartialEq)]
pub enum Command {
	Proof {
		calculus: CalculusKind,
		sequent: String,
	},
	Assume(String),
	Close,
	/// Номера строк с единицы.
	SelectLines(Vec<usize>),
	SelectBranch(usize),
	SelectNode(Vec<usize>),
	/// Номер формулы с единицы.
	SelectFormula {
		side: Side,
		index: usize,
	},
	Apply {
		rule: String,
		answers: Vec<String>,
	},
	Undo,
	Redo,
	Show,
	/// Проверить, что доказательство закончено.
	Done,
}

impl Command {
	fn name(&self) -> &'static str {
		match self {
			Command::Proof { .. } => "proof",
			Command::Assume(_) => "assume",
			Command::Close => "close",
			Command::SelectLines(_) => "select line",
			Command::SelectBranch(_) => "select branch",
			Command::SelectNode(_) => "select node",
			Command::SelectFormula { .. } => "select left/right",
			Command::Apply { .. } => "apply",
			Command::Undo => "undo",
			Command::Redo => "redo",
			Command::Show => "show",
			Command::Done => "done",
		}
	}
}

peg::parser!(
	grammar script_parser() for str {
		/// Пустая строка и строка-комментарий дают `None`.
		pub rule line() -> Option<(LocalSpan, Command)>
			= _ command:(start:position!() c:command() end:position!() { (LocalSpan(start..end), c) })? _ comment()? { command }

		rule command() -> Command
			= "proof" __ calculus:calculus() __ sequent:rest() { Command::Proof { calculus, sequent } }
			/ "assume" __ formula:rest() { Command::Assume(formula) }
			/ "close" { Command::Close }
			/ "select" __ "line" "s"? __ lines:number() ++ (_ ("," _)? ) { Command::SelectLines(lines) }
			/ "select" __ "branch" __ branch:number() { Command::SelectBranch(branch) }
			/ "select" __ "node" __ path:number() ++ "." { Command::SelectNode(path) }
			/ "select" __ side:side() __ index:number() { Command::SelectFormula { side, index } }
			/ "apply" __ name:rule_name() answers:(_ ":" _ a:answer() ++ (_ ";" _) { a })? {
				Command::Apply { rule: name, answers: answers.unwrap_or_default() }
			}
			/ "undo" { Command::Undo }
			/ "redo" { Command::Redo }
			/ "show" { Command::Show }
			/ "done" { Command::Done }

		rule calculus() -> CalculusKind
			= "fitch" { CalculusKind::Fitch }
			/ "gentzen" { CalculusKind::Gentzen }
			/ "sequent" { CalculusKind::Sequent }

		rule side() -> Side
			= "left" { Side::Left }
			/ "right" { Side::Right }

		rule rest() -> String
			= s:$((!"#" [_])+) { s.trim().to_string() }

		rule rule_name() -> String
			= s:$((![' ' | '\t' | ':' | '#'] [_])+) { s.to_string() }

		rule answer() -> String
			= s:$((![';' | '#'] [_])+) { s.trim().to_string() }

		rule number() -> usize
			= n:$(['0'..='9']+) {? n.parse().map_err(|_| "number is too big") }

		rule comment() = "#" [_]*

		rule __() = quiet!{[' ' | '\t']+}

		rule _() = quiet!{[' ' | '\t']*}
	}
);

#[derive(Debug, Error)]
pub enum ScriptError {
	#[error("unknown command, expected one of: {0}")]
	Syntax(String),
	#[error("no proof is started, begin with `proof fitch|gentzen|sequent <sequent>`")]
	NoProof,
	#[error("`{command}` is not available in {calculus} proofs")]
	Unsupported {
		command: &'static str,
		calculus: CalculusKind,
	},
	#[error("{calculus} proofs need exactly one formula after `⊢`")]
	SingleGoal {
		calculus: CalculusKind,
	},
	#[error("line numbers start from 1")]
	ZeroIndex,
	#[error("the proof is not finished")]
	Unfinished,
	#[error(transparent)]
	Formula(#[from] ParseError),
	#[error(transparent)]
	Rule(#[from] RuleError),
}

/// Доказательство, которое ведёт сценарий.
pub enum Session {
	Fitch(Engine<FitchProof>),
	Gentzen(Engine<GentzenProof>),
	Sequent(Engine<SequentProof>),
}

fn one_based(number: usize) -> Result<usize, ScriptError> {
	number.checked_sub(1).ok_or(ScriptError::ZeroIndex)
}

fn single_goal(calculus: CalculusKind, mut succedent: Vec<Formula>) -> Result<Formula, ScriptError> {
	match succedent.len() {
		1 => Ok(succedent.remove(0)),
		_ => Err(ScriptError::SingleGoal { calculus }),
	}
}

/// Правило Генцена можно назвать меткой, символьным именем или номером.
fn gentzen_rule(name: &str) -> Result<GentzenRule, RuleError> {
	match name.parse::<usize>() {
		Ok(number) => GentzenRule::from_number(number).ok_or_else(|| RuleError::UnknownRule(name.to_string())),
		Err(_) => name.parse(),
	}
}

impl Session {
	pub fn start(calculus: CalculusKind, sequent: &str) -> Result<Session, ScriptError> {
		let (antecedent, succedent) = parse_sequent(sequent)?;
		Ok(match calculus {
			CalculusKind::Fitch => {
				Session::Fitch(Engine::new(FitchProof::new(antecedent, single_goal(calculus, succedent)?))?)
			},
			CalculusKind::Gentzen => {
				Session::Gentzen(Engine::new(GentzenProof::new(antecedent, single_goal(calculus, succedent)?))?)
			},
			CalculusKind::Sequent => Session::Sequent(Engine::new(SequentProof::new(antecedent, succedent))?),
		})
	}

	pub fn calculus(&self) -> CalculusKind {
		match self {
			Session::Fitch(_) => CalculusKind::Fitch,
			Session::Gentzen(_) => CalculusKind::Gentzen,
			Session::Sequent(_) => CalculusKind::Sequent,
		}
	}

	pub fn is_finished(&self) -> bool {
		match self {
			Session::Fitch(engine) => engine.state().is_finished(),
			Session::Gentzen(engine) => engine.state().is_complete(),
			Session::Sequent(engine) => engine.state().is_proved(),
		}
	}

	fn unsupported(&self, command: &Command) -> ScriptError {
		ScriptError::Unsupported {
			command: command.name(),
			calculus: self.calculus(),
		}
	}

	fn apply(&mut self, rule: &str, prompt: &mut ScriptedPrompt) -> Result<(), RuleError> {
		match self {
			Session::Fitch(engine) => engine.run(rule.parse()?, prompt),
			Session::Gentzen(engine) => engine.run(gentzen_rule(rule)?, prompt),
			Session::Sequent(engine) => engine.run(rule.parse()?, prompt),
		}
	}

	fn undo(&mut self) -> Result<bool, RuleError> {
		match self {
			Session::Fitch(engine) => engine.undo(),
			Session::Gentzen(engine) => engine.undo(),
			Session::Sequent(engine) => engine.undo(),
		}
	}

	fn redo(&mut self) -> Result<bool, RuleError> {
		match self {
			Session::Fitch(engine) => engine.redo(),
			Session::Gentzen(engine) => engine.redo(),
			Session::Sequent(engine) => engine.redo(),
		}
	}

	/// Выполняет одну команду, кроме `proof`.
	pub fn execute(&mut self, command: &Command) -> Result<(), ScriptError> {
		match (&mut *self, command) {
			(Session::Fitch(engine), Command::Assume(text)) => {
				let formula = parse_formula(text)?;
				engine.act(|proof| proof.assume(formula))?;
			},
			(Session::Fitch(engine), Command::Close) => {
				engine.act(|proof| proof.close_branch())?;
			},
			(Session::Fitch(engine), Command::SelectLines(lines)) => {
				let lines = lines.iter().map(|&line| one_based(line)).collect::<Result<Vec<_>, _>>()?;
				engine.select(|proof| {
					proof.clear_selection();
					lines.iter().try_for_each(|&line| proof.select_line(line))
				})?;
			},
			(Session::Fitch(engine), Command::SelectBranch(branch)) => {
				engine.select(|proof| proof.select_branch(*branch))?;
			},
			(Session::Gentzen(engine), Command::SelectNode(path)) => match path.as_slice() {
				[node] => engine.select(|proof| proof.select(*node))?,
				_ => return Err(RuleError::InvalidSelection("a Gentzen node is a single number".to_string()).into()),
			},
			(Session::Sequent(engine), Command::SelectNode(path)) => match path.split_first() {
				Some((0, rest)) => engine.select(|proof| proof.select_node(rest.to_vec()))?,
				_ => return Err(RuleError::InvalidSelection("sequent addresses start with 0".to_string()).into()),
			},
			(Session::Sequent(engine), Command::SelectFormula { side, index }) => {
				let index = one_based(*index)?;
				engine.select(|proof| proof.select_formula(*side, index))?;
			},
			(session, Command::Apply { rule, answers }) => {
				let mut prompt = ScriptedPrompt::new(answers.iter().cloned());
				match session.apply(rule, &mut prompt) {
					Ok(()) => println!("{} {}", "applied".green().bold(), rule),
					Err(RuleError::UserCancelled) => {
						debug!(%rule, "rule cancelled, not enough answers");
						println!("{} {}", "cancelled".yellow().bold(), rule);
					},
					Err(err) => return Err(err.into()),
				}
			},
			(session, Command::Undo) => {
				if !session.undo()? {
					println!("{}", "nothing to undo".yellow());
				}
			},
			(session, Command::Redo) => {
				if !session.redo()? {
					println!("{}", "nothing to redo".yellow());
				}
			},
			(session, Command::Show) => print!("{}", session),
			(session, Command::Done) => {
				if !session.is_finished() {
					return Err(ScriptError::Unfinished);
				}
				println!("{}", "proof is finished".green().bold());
			},
			(session, command) => return Err(session.unsupported(command)),
		}
		Ok(())
	}
}

impl fmt::Display for Session {
	fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
		match self {
			Session::Fitch(engine) => write!(f, "{}", engine.state()),
			Session::Gentzen(engine) => write!(f, "{}", engine.state()),
			Session::Sequent(engine) => write!(f, "{}", engine.state()),
		}
	}
}

/// Разбирает сценарий. Пустые строки и комментарии пропускаются.
pub fn parse_script(input: &str) -> Result<Vec<Spanned<Command>>, Spanned<ScriptError>> {
	let mut commands = Vec::new();
	let mut start = 0;
	for line in input.split('\n') {
		let parsed = script_parser::line(line.trim_end_matches('\r')).map_err(|err| {
			let offset = err.location.offset;
			Spanned::new(
				ScriptError::Syntax(err.expected.tokens().collect::<Vec<_>>().join(", ")),
				LocalSpan(offset..offset + 1).globalize_span(start),
			)
		})?;
		if let Some((span, command)) = parsed {
			commands.push(Spanned::new(command, span.globalize_span(start)));
		}
		start += line.len() + 1;
	}
	Ok(commands)
}

/// Выполняет сценарий до первой ошибки и возвращает последнее доказательство.
pub fn execute(input: &str) -> Result<Option<Session>, Spanned<ScriptError>> {
	let mut session: Option<Session> = None;
	for command in parse_script(input)? {
		let Spanned { span, inner } = command;
		let at = |err: ScriptError| Spanned::new(err, GlobalSpan(span.0.clone()));
		debug!(command = inner.name(), "executing");

		if let Command::Proof { calculus, sequent } = &inner {
			session = Some(Session::start(*calculus, sequent).map_err(at)?);
			println!("{} {} proof", "started".green().bold(), calculus);
			continue;
		}
		match session.as_mut() {
			Some(current) => current.execute(&inner).map_err(at)?,
			None => return Err(at(ScriptError::NoProof)),
		}
	}
	Ok(session)
}
