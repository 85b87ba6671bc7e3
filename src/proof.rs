use crate::binding::occurs_in;
use crate::expr::Formula;
use crate::history::History;
use crate::parsing::{parse_term, ParseError};
use serde::{de::DeserializeOwned, Serialize};
use std::collections::VecDeque;
use std::fmt::{Debug, Display};
use std::str::FromStr;
use thiserror::Error;
use tracing::debug;

/// Все ошибки применения правил локальны: правило либо применилось целиком, либо состояние не изменилось.
#[derive(Debug, Error)]
pub enum RuleError {
	#[error("{0}")]
	Parse(#[from] ParseError),
	#[error("rule `{rule}` is not applicable here")]
	Inapplicable {
		rule: String,
	},
	#[error("`{term}` already occurs in the context, a fresh name is required")]
	FreshnessViolation {
		term: String,
	},
	#[error("cancelled")]
	UserCancelled,
	#[error("{0}")]
	StructuralMismatch(String),
	#[error("rule {rule} expects {expected}")]
	WrongConnective {
		rule: String,
		expected: &'static str,
	},
	#[error("invalid input: {0}")]
	InvalidInput(String),
	#[error("invalid selection: {0}")]
	InvalidSelection(String),
	#[error("unknown rule `{0}`")]
	UnknownRule(String),
	#[error("another rule is waiting for input")]
	Busy,
	#[error("no rule is waiting for input")]
	NothingPending,
	#[error("snapshot: {0}")]
	Snapshot(#[from] serde_json::Error),
}

impl RuleError {
	pub fn inapplicable<R: Display>(rule: R) -> RuleError {
		RuleError::Inapplicable { rule: rule.to_string() }
	}
}

/// Пользователь закрыл окно ввода.
#[derive(Clone, Copy, Debug, Eq, PartialEq)]
pub struct Cancelled;

/// Внешний собеседник, у которого правило спрашивает терм, выбор или порядок.
pub trait Prompt {
	fn prompt_term(&mut self, title: &str, label: &str) -> Result<String, Cancelled>;
	fn prompt_choice(&mut self, title: &str, options: &[String]) -> Result<String, Cancelled>;
	fn prompt_reorder(&mut self, items: &[String]) -> Result<Vec<String>, Cancelled>;
}

/// Что правилу нужно узнать у пользователя перед применением.
#[derive(Clone, Debug, Eq, PartialEq)]
pub enum InputRequest {
	Terms {
		title: String,
		labels: Vec<String>,
	},
	Choice {
		title: String,
		options: Vec<String>,
	},
	Reorder {
		items: Vec<String>,
	},
}

#[derive(Clone, Debug, Eq, PartialEq)]
pub enum InputResponse {
	Terms(Vec<String>),
	Choice(usize),
	/// Новый порядок как перестановка старых индексов.
	Reorder(Vec<usize>),
}

impl InputRequest {
	pub fn terms(title: &str, labels: &[&str]) -> InputRequest {
		InputRequest::Terms {
			title: title.to_string(),
			labels: labels.iter().map(|label| label.to_string()).collect(),
		}
	}

	/// Задаёт вопрос через `prompt`. Отмена превращается в `UserCancelled`.
	pub fn ask<P: Prompt + ?Sized>(&self, prompt: &mut P) -> Result<InputResponse, RuleError> {
		match self {
			InputRequest::Terms { title, labels } => {
				let mut answers = Vec::with_capacity(labels.len());
				for label in labels {
					answers.push(prompt.prompt_term(title, label).map_err(|_| RuleError::UserCancelled)?);
				}
				Ok(InputResponse::Terms(answers))
			},
			InputRequest::Choice { title, options } => {
				let chosen = prompt.prompt_choice(title, options).map_err(|_| RuleError::UserCancelled)?;
				options
					.iter()
					.position(|option| *option == chosen)
					.map(InputResponse::Choice)
					.ok_or_else(|| RuleError::InvalidInput(format!("`{}` is not one of the options", chosen)))
			},
			InputRequest::Reorder { items } => {
				let reordered = prompt.prompt_reorder(items).map_err(|_| RuleError::UserCancelled)?;
				let mut used = vec![false; items.len()];
				let mut order = Vec::with_capacity(reordered.len());
				for item in &reordered {
					let index = items
						.iter()
						.enumerate()
						.position(|(index, candidate)| !used[index] && candidate == item)
						.ok_or_else(|| RuleError::InvalidInput(format!("`{}` is not one of the items", item)))?;
					used[index] = true;
					order.push(index);
				}
				Ok(InputResponse::Reorder(order))
			},
		}
	}
}

impl InputResponse {
	pub fn term(&self, index: usize) -> Result<&str, RuleError> {
		match self {
			InputResponse::Terms(terms) => terms
				.get(index)
				.map(|term| term.trim())
				.ok_or_else(|| RuleError::InvalidInput(format!("missing answer #{}", index + 1))),
			_ => Err(RuleError::InvalidInput("expected a term".to_string())),
		}
	}

	pub fn choice(&self) -> Result<usize, RuleError> {
		match self {
			InputResponse::Choice(index) => Ok(*index),
			_ => Err(RuleError::InvalidInput("expected a choice".to_string())),
		}
	}

	pub fn order(&self) -> Result<&[usize], RuleError> {
		match self {
			InputResponse::Reorder(order) => Ok(order),
			_ => Err(RuleError::InvalidInput("expected a new order".to_string())),
		}
	}
}

/// Ответ на запрос, который правило обязано было получить.
pub fn required_input(input: Option<&InputResponse>) -> Result<&InputResponse, RuleError> {
	input.ok_or_else(|| RuleError::InvalidInput("this rule needs input".to_string()))
}

/// Собственная переменная для `∀I`, `∃E`, `∀r`, `∃l`: имя переменной или константы,
/// которого ещё нет ни в одной формуле контекста.
pub fn ensure_fresh<'a, I>(name: &str, context: I) -> Result<(), RuleError>
where
	I: IntoIterator<Item = &'a Formula>,
{
	match parse_term(name)? {
		Formula::Variable { .. } | Formula::Constant { .. } => {},
		_ => return Err(RuleError::InvalidInput(format!("`{}` is not a variable name", name))),
	}
	if occurs_in(name, context) {
		return Err(RuleError::FreshnessViolation { term: name.to_string() });
	}
	Ok(())
}

/// Отвечает заранее заготовленными строками, а когда они кончаются, отменяет ввод.
#[derive(Clone, Debug, Default)]
pub struct ScriptedPrompt {
	answers: VecDeque<String>,
}

impl ScriptedPrompt {
	pub fn new<I, S>(answers: I) -> ScriptedPrompt
	where
		I: IntoIterator<Item = S>,
		S: Into<String>,
	{
		ScriptedPrompt {
			answers: answers.into_iter().map(Into::into).collect(),
		}
	}

	pub fn remaining(&self) -> usize {
		self.answers.len()
	}
}

impl Prompt for ScriptedPrompt {
	fn prompt_term(&mut self, _title: &str, _label: &str) -> Result<String, Cancelled> {
		self.answers.pop_front().ok_or(Cancelled)
	}

	/// Ответ может быть текстом варианта или его номером с единицы.
	fn prompt_choice(&mut self, _title: &str, options: &[String]) -> Result<String, Cancelled> {
		let answer = self.answers.pop_front().ok_or(Cancelled)?;
		if options.contains(&answer) {
			return Ok(answer);
		}
		Ok(answer
			.trim()
			.parse::<usize>()
			.ok()
			.and_then(|n| n.checked_sub(1))
			.and_then(|index| options.get(index).cloned())
			.unwrap_or(answer))
	}

	/// Ответ это номера элементов через запятую: `2, 1, 3`.
	fn prompt_reorder(&mut self, items: &[String]) -> Result<Vec<String>, Cancelled> {
		let answer = self.answers.pop_front().ok_or(Cancelled)?;
		Ok(answer
			.split(',')
			.map(str::trim)
			.map(|piece| {
				piece
					.parse::<usize>()
					.ok()
					.and_then(|n| n.checked_sub(1))
					.and_then(|index| items.get(index).cloned())
					.unwrap_or_else(|| piece.to_string())
			})
			.collect())
	}
}

/// Одно исчисление: какие правила предложить, когда правило применимо и что оно строит.
/// `derive` ничего не меняет, а возвращает следующее состояние целиком.
pub trait Calculus: Clone + Serialize + DeserializeOwned {
	type Rule: Copy + Eq + Debug + Display + FromStr<Err = RuleError>;

	fn offered_rules(&self) -> Vec<Self::Rule>;
	fn is_applicable(&self, rule: Self::Rule) -> bool;
	fn input_request(&self, rule: Self::Rule) -> Option<InputRequest>;
	fn derive(&self, rule: Self::Rule, input: Option<&InputResponse>) -> Result<Self, RuleError>;
	fn clear_selection(&mut self);
}

#[derive(Clone, Debug, Eq, PartialEq)]
pub enum Invocation {
	Applied,
	NeedsInput(InputRequest),
}

/// Владеет состоянием доказательства, историей снимков и не более чем одним правилом, ждущим ввода.
pub struct Engine<C: Calculus> {
	state: C,
	history: History,
	pending: Option<C::Rule>,
}

impl<C: Calculus> Engine<C> {
	pub fn new(state: C) -> Result<Engine<C>, RuleError> {
		let initial = serde_json::to_string(&state)?;
		Ok(Engine {
			state,
			history: History::new(initial),
			pending: None,
		})
	}

	pub fn from_snapshot(snapshot: &str) -> Result<Engine<C>, RuleError> {
		Engine::new(serde_json::from_str(snapshot)?)
	}

	pub fn snapshot(&self) -> Result<String, RuleError> {
		Ok(serde_json::to_string(&self.state)?)
	}

	pub fn state(&self) -> &C {
		&self.state
	}

	pub fn history(&self) -> &History {
		&self.history
	}

	pub fn pending(&self) -> Option<C::Rule> {
		self.pending
	}

	pub fn offered_rules(&self) -> Vec<C::Rule> {
		self.state.offered_rules()
	}

	fn ensure_idle(&self) -> Result<(), RuleError> {
		match self.pending {
			Some(_) => Err(RuleError::Busy),
			None => Ok(()),
		}
	}

	fn commit(&mut self, mut next: C) -> Result<(), RuleError> {
		next.clear_selection();
		let snapshot = serde_json::to_string(&next)?;
		self.state = next;
		self.history.checkpoint(snapshot);
		Ok(())
	}

	fn settle(&mut self, rule: C::Rule, result: Result<C, RuleError>) -> Result<(), RuleError> {
		match result {
			Ok(next) => {
				self.commit(next)?;
				debug!(%rule, "rule applied");
				Ok(())
			},
			Err(err) => {
				debug!(%rule, error = %err, "rule rejected");
				self.state.clear_selection();
				Err(err)
			},
		}
	}

	/// Изменение выделения. Не попадает в историю.
	pub fn select<R, F>(&mut self, f: F) -> Result<R, RuleError>
	where
		F: FnOnce(&mut C) -> Result<R, RuleError>,
	{
		self.ensure_idle()?;
		let mut next = self.state.clone();
		let result = f(&mut next)?;
		self.state = next;
		Ok(result)
	}

	/// Действие над доказательством помимо правил (открыть или закрыть допущение).
	pub fn act<R, F>(&mut self, f: F) -> Result<R, RuleError>
	where
		F: FnOnce(&mut C) -> Result<R, RuleError>,
	{
		self.ensure_idle()?;
		let mut next = self.state.clone();
		match f(&mut next) {
			Ok(result) => {
				self.commit(next)?;
				Ok(result)
			},
			Err(err) => {
				self.state.clear_selection();
				Err(err)
			},
		}
	}

	/// Первая фаза: проверить применимость и либо применить правило, либо вернуть запрос ввода.
	pub fn invoke(&mut self, rule: C::Rule) -> Result<Invocation, RuleError> {
		self.ensure_idle()?;
		if !self.state.is_applicable(rule) {
			debug!(%rule, "rule is not applicable");
			self.state.clear_selection();
			return Err(RuleError::inapplicable(rule));
		}

		match self.state.input_request(rule) {
			Some(request) => {
				debug!(%rule, "rule waits for input");
				self.pending = Some(rule);
				Ok(Invocation::NeedsInput(request))
			},
			None => {
				let result = self.state.derive(rule, None);
				self.settle(rule, result)?;
				Ok(Invocation::Applied)
			},
		}
	}

	/// Вторая фаза. При нарушении свежести правило остаётся ждать нового ответа.
	pub fn respond(&mut self, response: InputResponse) -> Result<(), RuleError> {
		let rule = self.pending.ok_or(RuleError::NothingPending)?;
		let result = self.state.derive(rule, Some(&response));
		if let Err(err @ RuleError::FreshnessViolation { .. }) = result {
			debug!(%rule, error = %err, "input rejected, asking again");
			return Err(err);
		}
		self.pending = None;
		self.settle(rule, result)
	}

	/// Отмена ничего не меняет: ни состояние, ни выделение, ни историю.
	pub fn cancel(&mut self) {
		if let Some(rule) = self.pending.take() {
			debug!(%rule, "rule cancelled");
		}
	}

	/// Обе фазы сразу. Несвежий ответ переспрашивается; если после этого ввод отменён,
	/// возвращается последняя ошибка свежести.
	pub fn run<P: Prompt + ?Sized>(&mut self, rule: C::Rule, prompt: &mut P) -> Result<(), RuleError> {
		let request = match self.invoke(rule)? {
			Invocation::Applied => return Ok(()),
			Invocation::NeedsInput(request) => request,
		};

		let mut rejected = None;
		loop {
			let response = match request.ask(prompt) {
				Ok(response) => response,
				Err(err) => {
					self.cancel();
					if !matches!(err, RuleError::UserCancelled) {
						self.state.clear_selection();
					}
					return Err(rejected.unwrap_or(err));
				},
			};

			match self.respond(response) {
				Err(err @ RuleError::FreshnessViolation { .. }) => rejected = Some(err),
				other => return other,
			}
		}
	}

	pub fn undo(&mut self) -> Result<bool, RuleError> {
		self.ensure_idle()?;
		let restored = match self.history.undo() {
			Some(snapshot) => serde_json::from_str(snapshot),
			None => return Ok(false),
		};
		match restored {
			Ok(state) => {
				self.state = state;
				debug!(position = self.history.position(), "undo");
				Ok(true)
			},
			Err(err) => {
				self.history.redo();
				Err(err.into())
			},
		}
	}

	pub fn redo(&mut self) -> Result<bool, RuleError> {
		self.ensure_idle()?;
		let restored = match self.history.redo() {
			Some(snapshot) => serde_json::from_str(snapshot),
			None => return Ok(false),
		};
		match restored {
			Ok(state) => {
				self.state = state;
				debug!(position = self.history.position(), "redo");
				Ok(true)
			},
			Err(err) => {
				self.history.undo();
				Err(err.into())
			},
		}
	}
}
