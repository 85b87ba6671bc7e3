//! Линейный натуральный вывод в стиле Фитча: строки, вложенные допущения («ветви»)
//! и двенадцать пропозициональных правил.

use crate::expr::*;
use crate::parsing::parse_formula;
use crate::proof::*;
use crate::render::formula_to_string;
use serde::{Deserialize, Serialize};
use std::fmt;
use tracing::trace;

rules! {
	pub enum FitchRule {
		AndIntro => ("∧I", "and_intro"),
		AndElim => ("∧E", "and_elim"),
		OrIntro => ("∨I", "or_intro"),
		OrElim => ("∨E", "or_elim"),
		ImpliesIntro => ("⇒I", "implies_intro"),
		ImpliesElim => ("⇒E", "implies_elim"),
		NotIntro => ("¬I", "not_intro"),
		NotElim => ("¬E", "not_elim"),
		FalsumElim => ("⊥E", "falsum_elim"),
		Contradiction => ("C", "contradiction"),
		DoubleNegationElim => ("¬¬E", "double_negation_elim"),
		Reiteration => ("R", "reiteration"),
	}
}

pub const PREMISE: &str = "Premise";
pub const ASSUMPTION: &str = "Assumption";

#[derive(Clone, Debug, Eq, PartialEq, Serialize, Deserialize)]
pub struct Line {
	pub formula: Formula,
	pub rule: String,
	pub branch: usize,
}

/// Ветвь: непрерывный отрезок строк `first..=last`. У корневой ветви нет родителя.
#[derive(Clone, Debug, Eq, PartialEq, Serialize, Deserialize)]
pub struct Branch {
	pub parent: Option<usize>,
	pub first: usize,
	pub last: usize,
	pub closed: bool,
}

#[derive(Clone, Debug, Default, Eq, PartialEq, Serialize, Deserialize)]
pub struct FitchSelection {
	pub lines: Vec<usize>,
	pub branches: Vec<usize>,
}

#[derive(Clone, Debug, Eq, PartialEq, Serialize, Deserialize)]
pub struct FitchProof {
	lines: Vec<Line>,
	branches: Vec<Branch>,
	open_branches: Vec<usize>,
	goal: Formula,
	selection: FitchSelection,
}

impl FitchProof {
	pub fn new(premises: Vec<Formula>, goal: Formula) -> FitchProof {
		let last = premises.len().saturating_sub(1);
		FitchProof {
			lines: premises
				.into_iter()
				.map(|formula| Line { formula, rule: PREMISE.to_string(), branch: 0 })
				.collect(),
			branches: vec![Branch { parent: None, first: 0, last, closed: false }],
			open_branches: Vec::new(),
			goal,
			selection: FitchSelection::default(),
		}
	}

	pub fn lines(&self) -> &[Line] {
		&self.lines
	}

	pub fn branches(&self) -> &[Branch] {
		&self.branches
	}

	pub fn open_branches(&self) -> &[usize] {
		&self.open_branches
	}

	pub fn goal(&self) -> &Formula {
		&self.goal
	}

	pub fn selection(&self) -> &FitchSelection {
		&self.selection
	}

	/// Самая внутренняя открытая ветвь, или корень.
	pub fn current_branch(&self) -> usize {
		self.open_branches.last().copied().unwrap_or(0)
	}

	fn is_open_chain(&self, branch: usize) -> bool {
		branch == 0 || self.open_branches.contains(&branch)
	}

	fn depth(&self, mut branch: usize) -> usize {
		let mut depth = 0;
		while let Some(parent) = self.branches[branch].parent {
			depth += 1;
			branch = parent;
		}
		depth
	}

	/// Строка видна, если её ветвь ещё открыта.
	pub fn is_visible(&self, line: usize) -> bool {
		self.lines.get(line).map(|line| self.is_open_chain(line.branch)).unwrap_or(false)
	}

	/// Ветвь можно выбрать, если это текущая открытая ветвь или закрытая ветвь прямо внутри неё.
	pub fn is_selectable_branch(&self, branch: usize) -> bool {
		branch != 0
			&& branch < self.branches.len()
			&& (branch == self.current_branch()
				|| (self.branches[branch].closed && self.branches[branch].parent == Some(self.current_branch())))
	}

	/// Последняя строка корня совпадает с целью, и все допущения закрыты.
	pub fn is_finished(&self) -> bool {
		self.open_branches.is_empty()
			&& self
				.lines
				.last()
				.map(|line| line.branch == 0 && structural_equals(&line.formula, &self.goal))
				.unwrap_or(false)
	}

	pub fn select_line(&mut self, line: usize) -> Result<(), RuleError> {
		if !self.is_visible(line) {
			return Err(RuleError::InvalidSelection(format!("line {} is not available here", line + 1)));
		}
		toggle(&mut self.selection.lines, line);
		trace!(line, "line selection toggled");
		Ok(())
	}

	pub fn select_branch(&mut self, branch: usize) -> Result<(), RuleError> {
		if !self.is_selectable_branch(branch) {
			return Err(RuleError::InvalidSelection(format!("branch {} is not available here", branch)));
		}
		toggle(&mut self.selection.branches, branch);
		trace!(branch, "branch selection toggled");
		Ok(())
	}

	/// Открывает новое допущение.
	pub fn assume(&mut self, formula: Formula) -> Result<usize, RuleError> {
		let branch = self.branches.len();
		let first = self.lines.len();
		self.branches.push(Branch {
			parent: Some(self.current_branch()),
			first,
			last: first,
			closed: false,
		});
		self.open_branches.push(branch);
		self.push_line(formula, ASSUMPTION.to_string());
		self.selection = FitchSelection::default();
		Ok(branch)
	}

	/// Закрывает текущее допущение.
	pub fn close_branch(&mut self) -> Result<usize, RuleError> {
		let branch = self
			.open_branches
			.pop()
			.ok_or_else(|| RuleError::InvalidSelection("there is no open assumption".to_string()))?;
		self.branches[branch].closed = true;
		self.selection = FitchSelection::default();
		Ok(branch)
	}

	fn push_line(&mut self, formula: Formula, rule: String) -> usize {
		let index = self.lines.len();
		let branch = self.current_branch();
		self.lines.push(Line { formula, rule, branch });

		let mut current = Some(branch);
		while let Some(b) = current {
			self.branches[b].last = index;
			current = self.branches[b].parent;
		}
		index
	}

	fn line(&self, index: usize) -> &Formula {
		&self.lines[index].formula
	}

	fn selected_lines(&self) -> Vec<(usize, &Formula)> {
		self.selection.lines.iter().map(|&index| (index, self.line(index))).collect()
	}

	fn endpoints(&self, branch: usize) -> (&Formula, &Formula) {
		let branch = &self.branches[branch];
		(self.line(branch.first), self.line(branch.last))
	}

	fn range(&self, branch: usize) -> String {
		let branch = &self.branches[branch];
		format!("{}-{}", branch.first + 1, branch.last + 1)
	}

	/// Если ветвь это текущее допущение, правило её закрывает.
	fn discharge(&mut self, branch: usize) {
		if self.current_branch() == branch && branch != 0 {
			self.open_branches.pop();
			self.branches[branch].closed = true;
		}
	}

	fn precondition(&self, rule: FitchRule) -> bool {
		use FitchRule::*;

		let lines = self.selected_lines();
		let branches = &self.selection.branches;

		match rule {
			AndIntro | Reiteration | OrIntro => true,
			AndElim => matches!(lines[0].1.strip_parens(), Formula::Conjunction { .. }),
			OrElim => {
				matches!(lines[0].1.strip_parens(), Formula::Disjunction { .. })
					&& branches.iter().all(|&b| self.branches[b].closed)
					&& branches[0] != branches[1]
			},
			ImpliesIntro => true,
			ImpliesElim => modus_ponens(lines[0].1, lines[1].1).or_else(|| modus_ponens(lines[1].1, lines[0].1)).is_some(),
			NotIntro => self.endpoints(branches[0]).1.is_bottom(),
			NotElim => lines[0].1.negates(lines[1].1) || lines[1].1.negates(lines[0].1),
			FalsumElim => lines[0].1.is_bottom(),
			Contradiction => {
				let (first, last) = self.endpoints(branches[0]);
				first.negation_parts().0 >= 1 && last.is_bottom()
			},
			DoubleNegationElim => lines[0].1.negation_parts().0 >= 2,
		}
	}
}

fn toggle(selection: &mut Vec<usize>, item: usize) {
	match selection.iter().position(|&selected| selected == item) {
		Some(position) => {
			selection.remove(position);
		},
		None => selection.push(item),
	}
}

/// Для `A⇒B` и `A` возвращает `B`.
fn modus_ponens<'a>(implication: &'a Formula, antecedent: &Formula) -> Option<&'a Formula> {
	match implication.strip_parens() {
		Formula::Implication { left, right } if structural_equals(left, antecedent) => Some(&**right),
		_ => None,
	}
}

impl Calculus for FitchProof {
	type Rule = FitchRule;

	/// Набор правил зависит только от числа выбранных строк и ветвей.
	fn offered_rules(&self) -> Vec<FitchRule> {
		use FitchRule::*;

		match (self.selection.lines.len(), self.selection.branches.len()) {
			(1, 0) => vec![AndElim, OrIntro, DoubleNegationElim, FalsumElim, Reiteration],
			(2, 0) => vec![AndIntro, ImpliesElim, NotElim],
			(0, 1) => vec![ImpliesIntro, NotIntro, Contradiction],
			(1, 2) => vec![OrElim],
			_ => vec![],
		}
	}

	fn is_applicable(&self, rule: FitchRule) -> bool {
		self.offered_rules().contains(&rule) && self.precondition(rule)
	}

	fn input_request(&self, rule: FitchRule) -> Option<InputRequest> {
		match rule {
			FitchRule::AndElim => {
				let (left, right) = self.line(self.selection.lines[0]).sides()?;
				Some(InputRequest::Choice {
					title: rule.label().to_string(),
					options: vec![formula_to_string(left, false), formula_to_string(right, false)],
				})
			},
			FitchRule::OrIntro => Some(InputRequest::terms(rule.label(), &["other disjunct"])),
			FitchRule::FalsumElim => Some(InputRequest::terms(rule.label(), &["conclusion"])),
			_ => None,
		}
	}

	fn derive(&self, rule: FitchRule, input: Option<&InputResponse>) -> Result<FitchProof, RuleError> {
		use FitchRule::*;

		if !self.is_applicable(rule) {
			return Err(RuleError::inapplicable(rule));
		}

		let mut next = self.clone();
		let lines = &self.selection.lines;
		let branches = &self.selection.branches;
		let number = |index: usize| index + 1;

		let (formula, label) = match rule {
			AndIntro => (
				Formula::conjunction(self.line(lines[0]).clone(), self.line(lines[1]).clone()),
				format!("{} {},{}", rule, number(lines[0]), number(lines[1])),
			),
			AndElim => {
				let (left, right) = self
					.line(lines[0])
					.sides()
					.ok_or_else(|| RuleError::inapplicable(rule))?;
				let conjunct = match required_input(input)?.choice()? {
					0 => left,
					1 => right,
					other => return Err(RuleError::InvalidInput(format!("no conjunct #{}", other + 1))),
				};
				(conjunct.strip_parens().clone(), format!("{} {}", rule, number(lines[0])))
			},
			OrIntro => {
				let other = parse_formula(required_input(input)?.term(0)?)?;
				(
					Formula::disjunction(self.line(lines[0]).clone(), other),
					format!("{} {}", rule, number(lines[0])),
				)
			},
			OrElim => {
				let disjunction = self.line(lines[0]);
				let (left, right) = disjunction.sides().ok_or_else(|| RuleError::inapplicable(rule))?;
				let (first_a, last_a) = self.endpoints(branches[0]);
				let (first_b, last_b) = self.endpoints(branches[1]);

				let cases_match = (structural_equals(first_a, left) && structural_equals(first_b, right))
					|| (structural_equals(first_a, right) && structural_equals(first_b, left));
				if !cases_match {
					return Err(RuleError::StructuralMismatch(
						"the branches must assume the two disjuncts".to_string(),
					));
				}
				if !structural_equals(last_a, last_b) {
					return Err(RuleError::StructuralMismatch(format!(
						"the branches end differently: `{}` and `{}`",
						last_a, last_b
					)));
				}
				(
					last_a.clone(),
					format!(
						"{} {}, {}, {}",
						rule,
						number(lines[0]),
						self.range(branches[0]),
						self.range(branches[1])
					),
				)
			},
			ImpliesIntro => {
				let (first, last) = self.endpoints(branches[0]);
				next.discharge(branches[0]);
				(
					Formula::implication(first.clone(), last.clone()),
					format!("{} {}", rule, self.range(branches[0])),
				)
			},
			ImpliesElim => {
				let (a, b) = (self.line(lines[0]), self.line(lines[1]));
				let consequent = modus_ponens(a, b)
					.or_else(|| modus_ponens(b, a))
					.ok_or_else(|| RuleError::inapplicable(rule))?;
				(
					consequent.strip_parens().clone(),
					format!("{} {},{}", rule, number(lines[0]), number(lines[1])),
				)
			},
			NotIntro => {
				let (first, _) = self.endpoints(branches[0]);
				next.discharge(branches[0]);
				(Formula::negation(first.clone()), format!("{} {}", rule, self.range(branches[0])))
			},
			NotElim => (Formula::bottom(), format!("{} {},{}", rule, number(lines[0]), number(lines[1]))),
			FalsumElim => {
				let conclusion = parse_formula(required_input(input)?.term(0)?)?;
				(conclusion, format!("{} {}", rule, number(lines[0])))
			},
			Contradiction => {
				let (first, _) = self.endpoints(branches[0]);
				let conclusion = first.without_negations(1).ok_or_else(|| RuleError::inapplicable(rule))?;
				next.discharge(branches[0]);
				(conclusion, format!("{} {}", rule, self.range(branches[0])))
			},
			DoubleNegationElim => {
				let conclusion = self
					.line(lines[0])
					.without_negations(2)
					.ok_or_else(|| RuleError::inapplicable(rule))?;
				(conclusion, format!("{} {}", rule, number(lines[0])))
			},
			Reiteration => (self.line(lines[0]).clone(), format!("{} {}", rule, number(lines[0]))),
		};

		next.push_line(formula, label);
		Ok(next)
	}

	fn clear_selection(&mut self) {
		self.selection = FitchSelection::default();
	}
}

impl fmt::Display for FitchProof {
	fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
		writeln!(f, "goal: {}", self.goal)?;
		for (index, line) in self.lines.iter().enumerate() {
			let depth = self.depth(line.branch);
			let bars = "│ ".repeat(depth);
			let marker = if self.selection.lines.contains(&index) { "*" } else { " " };
			writeln!(f, "{}{:>3} {}{}    {}", marker, index + 1, bars, line.formula, line.rule)?;
			if line.rule == ASSUMPTION {
				writeln!(f, "     {}{}", "│ ".repeat(depth.saturating_sub(1)), "├──")?;
			}
		}
		Ok(())
	}
}
