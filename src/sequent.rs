//! Двустороннее исчисление секвенций `Γ ⊢ Δ`. Правило применяется к открытому листу
//! и к выбранной в нём формуле, листья без детей закрыты аксиомами.

use crate::binding::instantiate;
use crate::expr::*;
use crate::parsing::{parse_formula, parse_term};
use crate::proof::*;
use crate::render::formula_to_string;
use itertools::Itertools;
use serde::{Deserialize, Serialize};
use std::fmt;
use tracing::trace;

rules! {
	pub enum SequentRule {
		Identity => ("id", "id"),
		TopRight => ("⊤r", "top_right"),
		BottomLeft => ("⊥l", "bottom_left"),
		WeakenLeft => ("wl", "weaken_left"),
		WeakenRight => ("wr", "weaken_right"),
		ContractLeft => ("cl", "contract_left"),
		ContractRight => ("cr", "contract_right"),
		ExchangeLeft => ("exl", "exchange_left"),
		ExchangeRight => ("exr", "exchange_right"),
		AndLeft => ("∧l", "and_left"),
		AndRight => ("∧r", "and_right"),
		OrLeft => ("∨l", "or_left"),
		OrRight => ("∨r", "or_right"),
		ImpliesLeft => ("⇒l", "implies_left"),
		ImpliesRight => ("⇒r", "implies_right"),
		NotLeft => ("¬l", "not_left"),
		NotRight => ("¬r", "not_right"),
		ForallLeft => ("∀l", "forall_left"),
		ForallRight => ("∀r", "forall_right"),
		ExistsLeft => ("∃l", "exists_left"),
		ExistsRight => ("∃r", "exists_right"),
		Cut => ("cut", "cut"),
	}
}

#[derive(Clone, Copy, Debug, Eq, PartialEq, Hash, Serialize, Deserialize)]
pub enum Side {
	Left,
	Right,
}

impl fmt::Display for Side {
	fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
		match self {
			Side::Left => write!(f, "left"),
			Side::Right => write!(f, "right"),
		}
	}
}

#[derive(Clone, Copy, Debug, Eq, PartialEq, Hash, Serialize, Deserialize)]
pub struct SelectedFormula {
	pub side: Side,
	pub index: usize,
}

#[derive(Clone, Debug, Eq, PartialEq, Serialize, Deserialize)]
pub struct Sequent {
	pub antecedent: Vec<Formula>,
	pub succedent: Vec<Formula>,
	pub children: Vec<Sequent>,
	pub rule_applied: Option<SequentRule>,
	pub is_closed: bool,
}

/// Формула на стороне `side` под выбором, без внешних скобок.
fn selected_on(sequent: &Sequent, selected: Option<SelectedFormula>, side: Side) -> Option<&Formula> {
	let selected = selected.filter(|selected| selected.side == side)?;
	sequent.formulas(side).get(selected.index).map(Formula::strip_parens)
}

fn selected_kind(sequent: &Sequent, selected: Option<SelectedFormula>, side: Side, kind: FormulaKind) -> bool {
	selected_on(sequent, selected, side).map(|f| f.kind() == kind).unwrap_or(false)
}

/// Таблица применимости для подсказок. `Sequent::expand` проверяет то же самое независимо.
pub fn rule_check(rule: SequentRule, sequent: &Sequent, selected: Option<SelectedFormula>) -> bool {
	use FormulaKind as K;
	use SequentRule::*;
	use Side::*;

	match rule {
		Identity => sequent.antecedent.iter().any(|f| contains_formula(&sequent.succedent, f)),
		TopRight => sequent.succedent.iter().any(Formula::is_top),
		BottomLeft => sequent.antecedent.iter().any(Formula::is_bottom),
		WeakenLeft | ContractLeft => selected_on(sequent, selected, Left).is_some(),
		WeakenRight | ContractRight => selected_on(sequent, selected, Right).is_some(),
		ExchangeLeft => sequent.antecedent.len() >= 2,
		ExchangeRight => sequent.succedent.len() >= 2,
		AndLeft => selected_kind(sequent, selected, Left, K::Conjunction),
		AndRight => selected_kind(sequent, selected, Right, K::Conjunction),
		OrLeft => selected_kind(sequent, selected, Left, K::Disjunction),
		OrRight => selected_kind(sequent, selected, Right, K::Disjunction),
		ImpliesLeft => selected_kind(sequent, selected, Left, K::Implication),
		ImpliesRight => selected_kind(sequent, selected, Right, K::Implication),
		NotLeft => selected_kind(sequent, selected, Left, K::Negation),
		NotRight => selected_kind(sequent, selected, Right, K::Negation),
		ForallLeft => selected_kind(sequent, selected, Left, K::Forall),
		ForallRight => selected_kind(sequent, selected, Right, K::Forall),
		ExistsLeft => selected_kind(sequent, selected, Left, K::Exists),
		ExistsRight => selected_kind(sequent, selected, Right, K::Exists),
		Cut => true,
	}
}

/// Что правило спрашивает у пользователя.
pub fn input_request(rule: SequentRule, sequent: &Sequent) -> Option<InputRequest> {
	use SequentRule::*;

	let title = rule.label();
	let items = |formulas: &[Formula]| formulas.iter().map(|f| formula_to_string(f, false)).collect::<Vec<_>>();
	match rule {
		ForallLeft | ExistsRight => Some(InputRequest::terms(title, &["term"])),
		ForallRight | ExistsLeft => Some(InputRequest::terms(title, &["eigenvariable"])),
		Cut => Some(InputRequest::terms(title, &["cut formula"])),
		ExchangeLeft => Some(InputRequest::Reorder { items: items(&sequent.antecedent) }),
		ExchangeRight => Some(InputRequest::Reorder { items: items(&sequent.succedent) }),
		_ => None,
	}
}

fn wrong_connective(rule: SequentRule, expected: &'static str) -> RuleError {
	RuleError::WrongConnective { rule: rule.to_string(), expected }
}

/// Проверяет, что `order` это перестановка `0..len`.
fn permutation(order: &[usize], len: usize) -> Result<(), RuleError> {
	if order.len() == len && order.iter().copied().sorted().eq(0..len) {
		Ok(())
	} else {
		Err(RuleError::InvalidInput("the new order must use every formula exactly once".to_string()))
	}
}

impl Sequent {
	pub fn new(antecedent: Vec<Formula>, succedent: Vec<Formula>) -> Sequent {
		Sequent {
			antecedent,
			succedent,
			children: Vec::new(),
			rule_applied: None,
			is_closed: false,
		}
	}

	pub fn formulas(&self, side: Side) -> &[Formula] {
		match side {
			Side::Left => &self.antecedent,
			Side::Right => &self.succedent,
		}
	}

	fn formulas_mut(&mut self, side: Side) -> &mut Vec<Formula> {
		match side {
			Side::Left => &mut self.antecedent,
			Side::Right => &mut self.succedent,
		}
	}

	/// Лист, к которому ещё не применяли правил.
	pub fn is_open(&self) -> bool {
		self.rule_applied.is_none()
	}

	pub fn is_proved(&self) -> bool {
		if self.children.is_empty() {
			self.is_closed
		} else {
			self.children.iter().all(Sequent::is_proved)
		}
	}

	/// Копия без поддерева: заготовка для посылки.
	fn premise(&self) -> Sequent {
		Sequent::new(self.antecedent.clone(), self.succedent.clone())
	}

	fn with_replaced(&self, side: Side, index: usize, replacement: Vec<Formula>) -> Sequent {
		let mut premise = self.premise();
		premise.formulas_mut(side).splice(index..=index, replacement.into_iter().map(Formula::into_stripped));
		premise
	}

	fn take(&self, selected: Option<SelectedFormula>, side: Side) -> Result<(usize, &Formula), RuleError> {
		match selected {
			Some(selected) if selected.side == side => self
				.formulas(side)
				.get(selected.index)
				.map(|formula| (selected.index, formula.strip_parens()))
				.ok_or_else(|| RuleError::InvalidSelection(format!("no formula #{} on the {}", selected.index + 1, side))),
			_ => Err(RuleError::InvalidSelection(format!("select a formula on the {} first", side))),
		}
	}

	/// Посылки правила снизу вверх. Пустой список значит, что лист закрыт аксиомой.
	pub fn expand(
		&self,
		rule: SequentRule,
		selected: Option<SelectedFormula>,
		input: Option<&InputResponse>,
	) -> Result<Vec<Sequent>, RuleError> {
		use SequentRule::*;
		use Side::*;

		let take = |side: Side| self.take(selected, side);

		let premises = match rule {
			Identity => {
				let shared = self.antecedent.iter().find(|f| contains_formula(&self.succedent, f));
				match shared {
					Some(_) => vec![],
					None => {
						return Err(RuleError::StructuralMismatch(
							"no formula occurs on both sides".to_string(),
						))
					},
				}
			},
			TopRight => {
				if !self.succedent.iter().any(Formula::is_top) {
					return Err(RuleError::inapplicable(rule));
				}
				vec![]
			},
			BottomLeft => {
				if !self.antecedent.iter().any(Formula::is_bottom) {
					return Err(RuleError::inapplicable(rule));
				}
				vec![]
			},
			WeakenLeft | WeakenRight => {
				let side = if rule == WeakenLeft { Left } else { Right };
				let (index, _) = take(side)?;
				vec![self.with_replaced(side, index, vec![])]
			},
			ContractLeft | ContractRight => {
				let side = if rule == ContractLeft { Left } else { Right };
				let (index, formula) = take(side)?;
				vec![self.with_replaced(side, index, vec![formula.clone(), formula.clone()])]
			},
			ExchangeLeft | ExchangeRight => {
				let side = if rule == ExchangeLeft { Left } else { Right };
				let formulas = self.formulas(side);
				if formulas.len() < 2 {
					return Err(RuleError::inapplicable(rule));
				}
				let order = required_input(input)?.order()?;
				permutation(order, formulas.len())?;
				let mut premise = self.premise();
				*premise.formulas_mut(side) = order.iter().map(|&index| formulas[index].clone()).collect();
				vec![premise]
			},
			AndLeft => match take(Left)? {
				(index, Formula::Conjunction { left, right }) => {
					vec![self.with_replaced(Left, index, vec![(**left).clone(), (**right).clone()])]
				},
				_ => return Err(wrong_connective(rule, "a conjunction")),
			},
			AndRight => match take(Right)? {
				(index, Formula::Conjunction { left, right }) => vec![
					self.with_replaced(Right, index, vec![(**left).clone()]),
					self.with_replaced(Right, index, vec![(**right).clone()]),
				],
				_ => return Err(wrong_connective(rule, "a conjunction")),
			},
			OrLeft => match take(Left)? {
				(index, Formula::Disjunction { left, right }) => vec![
					self.with_replaced(Left, index, vec![(**left).clone()]),
					self.with_replaced(Left, index, vec![(**right).clone()]),
				],
				_ => return Err(wrong_connective(rule, "a disjunction")),
			},
			OrRight => match take(Right)? {
				(index, Formula::Disjunction { left, right }) => {
					vec![self.with_replaced(Right, index, vec![(**left).clone(), (**right).clone()])]
				},
				_ => return Err(wrong_connective(rule, "a disjunction")),
			},
			ImpliesLeft => match take(Left)? {
				(index, Formula::Implication { left, right }) => {
					let mut first = self.with_replaced(Left, index, vec![]);
					first.succedent.push((**left).clone().into_stripped());
					vec![first, self.with_replaced(Left, index, vec![(**right).clone()])]
				},
				_ => return Err(wrong_connective(rule, "an implication")),
			},
			ImpliesRight => match take(Right)? {
				(index, Formula::Implication { left, right }) => {
					let mut premise = self.with_replaced(Right, index, vec![(**right).clone()]);
					premise.antecedent.push((**left).clone().into_stripped());
					vec![premise]
				},
				_ => return Err(wrong_connective(rule, "an implication")),
			},
			NotLeft | NotRight => {
				let side = if rule == NotLeft { Left } else { Right };
				let (index, formula) = take(side)?;
				let operand = formula
					.without_negations(1)
					.ok_or_else(|| wrong_connective(rule, "a negation"))?
					.into_stripped();
				let mut premise = self.with_replaced(side, index, vec![]);
				match side {
					Left => premise.succedent.push(operand),
					Right => premise.antecedent.push(operand),
				}
				vec![premise]
			},
			ForallLeft | ExistsRight | ForallRight | ExistsLeft => {
				let (side, kind, expected) = match rule {
					ForallLeft => (Left, FormulaKind::Forall, "a universal formula"),
					ForallRight => (Right, FormulaKind::Forall, "a universal formula"),
					ExistsLeft => (Left, FormulaKind::Exists, "an existential formula"),
					_ => (Right, FormulaKind::Exists, "an existential formula"),
				};
				let (index, formula) = take(side)?;
				if formula.kind() != kind {
					return Err(wrong_connective(rule, expected));
				}
				let (variable, operand) = formula.quantified().ok_or_else(|| wrong_connective(rule, expected))?;

				let term = required_input(input)?.term(0)?;
				if matches!(rule, ForallRight | ExistsLeft) {
					ensure_fresh(term, self.antecedent.iter().chain(self.succedent.iter()))?;
				} else {
					parse_term(term)?;
				}
				let instance = instantiate(operand, variable, term)?;
				vec![self.with_replaced(side, index, vec![instance])]
			},
			Cut => {
				let cut = parse_formula(required_input(input)?.term(0)?)?.into_stripped();
				let mut left = self.premise();
				left.succedent.push(cut.clone());
				let mut right = self.premise();
				right.antecedent.insert(0, cut);
				vec![left, right]
			},
		};

		Ok(premises)
	}

	fn fmt_tree(&self, f: &mut fmt::Formatter, address: &str, depth: usize, active: Option<&str>) -> fmt::Result {
		let marker = if active == Some(address) { "*" } else { " " };
		write!(f, "{}{}{:<8}{}", marker, "  ".repeat(depth), address, self)?;
		if let Some(rule) = self.rule_applied {
			write!(f, "    {}", rule)?;
		}
		if self.is_closed {
			write!(f, " ✓")?;
		}
		writeln!(f)?;
		for (index, child) in self.children.iter().enumerate() {
			child.fmt_tree(f, &format!("{}.{}", address, index), depth + 1, active)?;
		}
		Ok(())
	}
}

impl fmt::Display for Sequent {
	fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
		let antecedent = self.antecedent.iter().join(", ");
		let succedent = self.succedent.iter().join(", ");
		match (antecedent.is_empty(), succedent.is_empty()) {
			(true, true) => write!(f, "⊢"),
			(true, false) => write!(f, "⊢ {}", succedent),
			(false, true) => write!(f, "{} ⊢", antecedent),
			(false, false) => write!(f, "{} ⊢ {}", antecedent, succedent),
		}
	}
}

/// Узлы адресуются путём из номеров детей от корня.
#[derive(Clone, Debug, Eq, PartialEq, Serialize, Deserialize)]
pub struct SequentProof {
	root: Sequent,
	side: Option<Vec<usize>>,
	selected: Option<SelectedFormula>,
}

impl SequentProof {
	pub fn new(antecedent: Vec<Formula>, succedent: Vec<Formula>) -> SequentProof {
		SequentProof {
			root: Sequent::new(antecedent, succedent),
			side: Some(Vec::new()),
			selected: None,
		}
	}

	pub fn root(&self) -> &Sequent {
		&self.root
	}

	pub fn side(&self) -> Option<&[usize]> {
		self.side.as_deref()
	}

	pub fn selected(&self) -> Option<SelectedFormula> {
		self.selected
	}

	pub fn node(&self, path: &[usize]) -> Option<&Sequent> {
		path.iter().try_fold(&self.root, |node, &index| node.children.get(index))
	}

	fn node_mut(&mut self, path: &[usize]) -> Option<&mut Sequent> {
		path.iter().try_fold(&mut self.root, |node, &index| node.children.get_mut(index))
	}

	fn active(&self) -> Option<&Sequent> {
		self.node(self.side.as_deref()?)
	}

	pub fn is_proved(&self) -> bool {
		self.root.is_proved()
	}

	/// Пути всех открытых листьев в прямом порядке.
	pub fn open_leaves(&self) -> Vec<Vec<usize>> {
		fn walk(node: &Sequent, path: &mut Vec<usize>, found: &mut Vec<Vec<usize>>) {
			if node.is_open() {
				found.push(path.clone());
			}
			for (index, child) in node.children.iter().enumerate() {
				path.push(index);
				walk(child, path, found);
				path.pop();
			}
		}

		let mut found = Vec::new();
		walk(&self.root, &mut Vec::new(), &mut found);
		found
	}

	/// Делает лист по пути активным и сбрасывает выбор формулы.
	pub fn select_node(&mut self, path: Vec<usize>) -> Result<(), RuleError> {
		if !self.node(&path).map(Sequent::is_open).unwrap_or(false) {
			return Err(RuleError::InvalidSelection(format!("{} is not an open sequent", address(&path))));
		}
		trace!(?path, "sequent selected");
		self.side = Some(path);
		self.selected = None;
		Ok(())
	}

	pub fn select_formula(&mut self, side: Side, index: usize) -> Result<(), RuleError> {
		let node = self
			.active()
			.ok_or_else(|| RuleError::InvalidSelection("select a sequent first".to_string()))?;
		if index >= node.formulas(side).len() {
			return Err(RuleError::InvalidSelection(format!("no formula #{} on the {}", index + 1, side)));
		}
		self.selected = Some(SelectedFormula { side, index });
		trace!(%side, index, "formula selected");
		Ok(())
	}
}

/// `0` это корень, `0.1` его второй ребёнок.
pub fn address(path: &[usize]) -> String {
	std::iter::once(0).chain(path.iter().copied()).join(".")
}

impl Calculus for SequentProof {
	type Rule = SequentRule;

	fn offered_rules(&self) -> Vec<SequentRule> {
		match self.active() {
			Some(node) if node.is_open() => SequentRule::ALL.to_vec(),
			_ => vec![],
		}
	}

	fn is_applicable(&self, rule: SequentRule) -> bool {
		match self.active() {
			Some(node) => node.is_open() && rule_check(rule, node, self.selected),
			None => false,
		}
	}

	fn input_request(&self, rule: SequentRule) -> Option<InputRequest> {
		input_request(rule, self.active()?)
	}

	fn derive(&self, rule: SequentRule, input: Option<&InputResponse>) -> Result<SequentProof, RuleError> {
		let path = self.side.as_deref().ok_or_else(|| RuleError::inapplicable(rule))?;
		let node = self.node(path).filter(|node| node.is_open()).ok_or_else(|| RuleError::inapplicable(rule))?;

		let premises = node.expand(rule, self.selected, input)?;
		let mut next = self.clone();
		let node = next.node_mut(path).ok_or_else(|| RuleError::inapplicable(rule))?;
		node.is_closed = premises.is_empty();
		node.children = premises;
		node.rule_applied = Some(rule);
		Ok(next)
	}

	fn clear_selection(&mut self) {
		self.side = None;
		self.selected = None;
	}
}

impl fmt::Display for SequentProof {
	fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
		let active = self.side.as_deref().map(address);
		self.root.fmt_tree(f, "0", 0, active.as_deref())
	}
}
