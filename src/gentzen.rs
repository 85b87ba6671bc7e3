//! Натуральный вывод деревом: цель в корне, правило раскрывает открытый лист в посылки.
//! Допущения живут в общем списке и видны только в поддереве узла, где их открыли.

use crate::axioms::matching_axiom;
use crate::binding::*;
use crate::expr::*;
use crate::parsing::{parse_formula, parse_term};
use crate::proof::*;
use crate::render::formula_to_string;
use petgraph::graph::{Graph, NodeIndex};
use petgraph::visit::EdgeRef;
use petgraph::Direction;
use serde::{Deserialize, Serialize};
use std::fmt;
use tracing::trace;

rules! {
	pub enum GentzenRule {
		AndIntro => ("∧I", "and_intro"),
		AndElimLeft => ("∧E1", "and_elim_1"),
		AndElimRight => ("∧E2", "and_elim_2"),
		OrIntroLeft => ("∨I1", "or_intro_1"),
		OrIntroRight => ("∨I2", "or_intro_2"),
		OrElim => ("∨E", "or_elim"),
		ImpliesIntro => ("⇒I", "implies_intro"),
		ImpliesElim => ("⇒E", "implies_elim"),
		NotIntro => ("¬I", "not_intro"),
		NotElim => ("¬E", "not_elim"),
		FalsumElim => ("⊥E1", "falsum_elim"),
		Reductio => ("⊥E2", "reductio"),
		TopIntro => ("⊤I", "top_intro"),
		ExistsIntro => ("∃I", "exists_intro"),
		ForallIntro => ("∀I", "forall_intro"),
		ForallElim => ("∀E", "forall_elim"),
		ExistsElim => ("∃E", "exists_elim"),
		EqualityElimLeft => ("=E1", "equality_elim_1"),
		EqualityElimRight => ("=E2", "equality_elim_2"),
		EqualityIntro => ("=I", "equality_intro"),
		/// Закрыть лист видимым допущением или аксиомой.
		Close => ("close", "close"),
	}
}

impl GentzenRule {
	/// Номер правила с единицы. У `close` номера нет.
	pub fn number(&self) -> Option<usize> {
		match self {
			GentzenRule::Close => None,
			rule => GentzenRule::ALL.iter().position(|r| r == rule).map(|index| index + 1),
		}
	}

	pub fn from_number(number: usize) -> Option<GentzenRule> {
		GentzenRule::ALL
			.iter()
			.copied()
			.find(|rule| rule.number() == Some(number))
	}
}

/// Правила, которые предлагаются для любой цели.
const ELIMINATIONS: &[GentzenRule] = &[
	GentzenRule::AndElimLeft,
	GentzenRule::AndElimRight,
	GentzenRule::OrElim,
	GentzenRule::ImpliesElim,
	GentzenRule::FalsumElim,
	GentzenRule::Reductio,
	GentzenRule::ForallElim,
	GentzenRule::ExistsElim,
	GentzenRule::EqualityElimLeft,
	GentzenRule::EqualityElimRight,
	GentzenRule::Close,
];

fn introductions(kind: FormulaKind) -> &'static [GentzenRule] {
	use GentzenRule::*;

	match kind {
		FormulaKind::Conjunction => &[AndIntro],
		FormulaKind::Disjunction => &[OrIntroLeft, OrIntroRight],
		FormulaKind::Implication => &[ImpliesIntro],
		FormulaKind::Negation => &[NotIntro],
		FormulaKind::Exists => &[ExistsIntro],
		FormulaKind::Forall => &[ForallIntro],
		FormulaKind::Equality => &[EqualityIntro],
		FormulaKind::Atom => &[TopIntro, NotElim],
		_ => &[],
	}
}

/// Проверяет главную связку формулы, которую пользователь ввёл для правила.
pub fn check_correct(parsed: &Formula, rule: GentzenRule) -> Result<(), RuleError> {
	use GentzenRule::*;

	let parsed = parsed.strip_parens();
	let (kind, expected) = match rule {
		AndElimLeft | AndElimRight => (FormulaKind::Conjunction, "a conjunction"),
		OrElim => (FormulaKind::Disjunction, "a disjunction"),
		ForallElim => (FormulaKind::Forall, "a universal formula"),
		ExistsElim => (FormulaKind::Exists, "an existential formula"),
		EqualityElimLeft | EqualityElimRight => (FormulaKind::Equality, "an equation"),
		EqualityIntro => (FormulaKind::Predicate, "a predicate"),
		_ => return Ok(()),
	};

	let wrong = parsed.kind() != kind
		|| matches!(parsed, Formula::Equality { operator: EqualityOperator::NotEqual, .. });
	if wrong {
		return Err(RuleError::WrongConnective { rule: rule.to_string(), expected });
	}
	Ok(())
}

/// Вывод в дереве. `level` это глубина от корня.
#[derive(Clone, Debug, Eq, PartialEq, Serialize, Deserialize)]
pub struct Conclusion {
	pub level: usize,
	pub formula: Formula,
	pub rule: Option<GentzenRule>,
	pub closed: bool,
	pub substitution: Option<Substitution>,
	pub justification: Option<String>,
}

impl Conclusion {
	fn new(level: usize, formula: Formula) -> Conclusion {
		Conclusion {
			level,
			formula,
			rule: None,
			closed: false,
			substitution: None,
			justification: None,
		}
	}
}

/// Допущение видно в поддереве `scope` и нигде больше.
#[derive(Clone, Debug, Eq, PartialEq, Serialize, Deserialize)]
pub struct Hypothesis {
	pub level: usize,
	pub formula: Formula,
	pub scope: NodeIndex,
}

#[derive(Clone, Debug, Serialize, Deserialize)]
pub struct GentzenProof {
	/// Рёбра идут от вывода к посылкам, вес ребра это номер посылки.
	tree: Graph<Conclusion, usize>,
	root: NodeIndex,
	hypotheses: Vec<Hypothesis>,
	side: Option<NodeIndex>,
}

impl GentzenProof {
	/// Посылки становятся допущениями, видимыми во всём дереве. Корень сразу выбран.
	pub fn new(premises: Vec<Formula>, goal: Formula) -> GentzenProof {
		let mut tree = Graph::new();
		let root = tree.add_node(Conclusion::new(0, goal));
		GentzenProof {
			tree,
			root,
			hypotheses: premises
				.into_iter()
				.map(|formula| Hypothesis { level: 0, formula, scope: root })
				.collect(),
			side: Some(root),
		}
	}

	pub fn root(&self) -> NodeIndex {
		self.root
	}

	pub fn side(&self) -> Option<NodeIndex> {
		self.side
	}

	pub fn hypotheses(&self) -> &[Hypothesis] {
		&self.hypotheses
	}

	pub fn node_count(&self) -> usize {
		self.tree.node_count()
	}

	pub fn conclusion(&self, node: NodeIndex) -> Option<&Conclusion> {
		self.tree.node_weight(node)
	}

	/// Посылки узла в порядке их создания.
	pub fn children(&self, node: NodeIndex) -> Vec<NodeIndex> {
		let mut edges: Vec<(usize, NodeIndex)> = self
			.tree
			.edges_directed(node, Direction::Outgoing)
			.map(|edge| (*edge.weight(), edge.target()))
			.collect();
		edges.sort();
		edges.into_iter().map(|(_, child)| child).collect()
	}

	pub fn parent(&self, node: NodeIndex) -> Option<NodeIndex> {
		self.tree.neighbors_directed(node, Direction::Incoming).next()
	}

	fn is_ancestor_or_self(&self, ancestor: NodeIndex, node: NodeIndex) -> bool {
		let mut current = Some(node);
		while let Some(n) = current {
			if n == ancestor {
				return true;
			}
			current = self.parent(n);
		}
		false
	}

	pub fn visible_hypotheses(&self, node: NodeIndex) -> Vec<&Hypothesis> {
		self.hypotheses
			.iter()
			.filter(|hypothesis| self.is_ancestor_or_self(hypothesis.scope, node))
			.collect()
	}

	fn is_open(&self, node: NodeIndex) -> bool {
		self.tree.node_weight(node).map(|c| c.rule.is_none()).unwrap_or(false)
	}

	pub fn open_leaves(&self) -> Vec<NodeIndex> {
		self.tree.node_indices().filter(|&node| self.is_open(node)).collect()
	}

	/// Все листья закрыты.
	pub fn is_complete(&self) -> bool {
		self.open_leaves().is_empty()
	}

	pub fn select(&mut self, node: usize) -> Result<(), RuleError> {
		let index = NodeIndex::new(node);
		if !self.is_open(index) {
			return Err(RuleError::InvalidSelection(format!("node {} is not an open leaf", node)));
		}
		self.side = Some(index);
		trace!(node, "node selected");
		Ok(())
	}

	fn goal(&self) -> Option<(NodeIndex, &Formula)> {
		let node = self.side?;
		Some((node, self.tree.node_weight(node)?.formula.strip_parens()))
	}

	/// Чем можно закрыть цель: допущением или номером аксиомы.
	fn closing_justification(&self, node: NodeIndex, goal: &Formula) -> Option<String> {
		if self
			.visible_hypotheses(node)
			.iter()
			.any(|hypothesis| structural_equals(&hypothesis.formula, goal))
		{
			return Some("hypothesis".to_string());
		}
		matching_axiom(goal).map(|number| format!("axiom Q{}", number))
	}

	fn precondition(&self, rule: GentzenRule, node: NodeIndex, goal: &Formula) -> bool {
		use GentzenRule::*;

		match rule {
			TopIntro => goal.is_top(),
			NotElim => goal.is_bottom(),
			NotIntro => goal.negation_parts().0 >= 1,
			EqualityIntro => matches!(goal, Formula::Equality { operator: EqualityOperator::Equal, .. }),
			Close => self.closing_justification(node, goal).is_some(),
			_ => true,
		}
	}

	fn add_premise(&mut self, parent: NodeIndex, position: usize, formula: Formula) -> NodeIndex {
		let level = self.tree[parent].level + 1;
		let child = self.tree.add_node(Conclusion::new(level, formula.into_stripped()));
		self.tree.add_edge(parent, child, position);
		child
	}

	fn add_premises(&mut self, parent: NodeIndex, formulas: Vec<Formula>) -> Vec<NodeIndex> {
		formulas
			.into_iter()
			.enumerate()
			.map(|(position, formula)| self.add_premise(parent, position, formula))
			.collect()
	}

	fn assume(&mut self, scope: NodeIndex, formula: Formula) {
		let level = self.tree[scope].level.saturating_sub(1);
		self.hypotheses.push(Hypothesis { level, formula: formula.into_stripped(), scope });
	}

	fn close(&mut self, node: NodeIndex, justification: String) {
		let conclusion = &mut self.tree[node];
		conclusion.closed = true;
		conclusion.justification = Some(justification);
	}
}

fn parse_checked(text: &str, rule: GentzenRule) -> Result<Formula, RuleError> {
	let parsed = parse_formula(text)?.into_stripped();
	check_correct(&parsed, rule)?;
	Ok(parsed)
}

fn mismatch(message: String) -> RuleError {
	RuleError::StructuralMismatch(message)
}

impl Calculus for GentzenProof {
	type Rule = GentzenRule;

	fn offered_rules(&self) -> Vec<GentzenRule> {
		match self.goal() {
			Some((_, goal)) => introductions(goal.kind()).iter().chain(ELIMINATIONS).copied().collect(),
			None => vec![],
		}
	}

	fn is_applicable(&self, rule: GentzenRule) -> bool {
		match self.goal() {
			Some((node, goal)) => self.offered_rules().contains(&rule) && self.precondition(rule, node, goal),
			None => false,
		}
	}

	fn input_request(&self, rule: GentzenRule) -> Option<InputRequest> {
		use GentzenRule::*;

		let title = rule.label();
		match rule {
			AndElimLeft | AndElimRight => Some(InputRequest::terms(title, &["conjunction"])),
			OrElim => Some(InputRequest::terms(title, &["disjunction"])),
			ImpliesElim => Some(InputRequest::terms(title, &["antecedent"])),
			NotElim => Some(InputRequest::terms(title, &["formula"])),
			ExistsIntro => Some(InputRequest::terms(title, &["term"])),
			ForallIntro => Some(InputRequest::terms(title, &["eigenvariable"])),
			ForallElim => Some(InputRequest::terms(title, &["universal formula", "term"])),
			ExistsElim => Some(InputRequest::terms(title, &["existential formula", "eigenvariable"])),
			EqualityElimLeft | EqualityElimRight => Some(InputRequest::terms(title, &["equation"])),
			EqualityIntro => {
				let (_, goal) = self.goal()?;
				let (left, right) = goal.sides()?;
				if structural_equals(left, right) {
					None
				} else {
					Some(InputRequest::terms(title, &["predicate"]))
				}
			},
			_ => None,
		}
	}

	fn derive(&self, rule: GentzenRule, input: Option<&InputResponse>) -> Result<GentzenProof, RuleError> {
		use GentzenRule::*;

		let (node, goal) = self.goal().ok_or_else(|| RuleError::inapplicable(rule))?;
		if !self.is_applicable(rule) {
			return Err(RuleError::inapplicable(rule));
		}

		let mut next = self.clone();
		let inapplicable = || RuleError::inapplicable(rule);

		match rule {
			AndIntro => {
				let (left, right) = goal.sides().ok_or_else(inapplicable)?;
				next.add_premises(node, vec![left.clone(), right.clone()]);
			},
			AndElimLeft | AndElimRight => {
				let conjunction = parse_checked(required_input(input)?.term(0)?, rule)?;
				let (left, right) = conjunction.sides().ok_or_else(inapplicable)?;
				let kept = if rule == AndElimLeft { left } else { right };
				if !structural_equals(kept, goal) {
					return Err(mismatch(format!("`{}` is not a conjunct of `{}`", goal, conjunction)));
				}
				next.add_premises(node, vec![conjunction]);
			},
			OrIntroLeft | OrIntroRight => {
				let (left, right) = goal.sides().ok_or_else(inapplicable)?;
				let kept = if rule == OrIntroLeft { left } else { right };
				next.add_premises(node, vec![kept.clone()]);
			},
			OrElim => {
				let disjunction = parse_checked(required_input(input)?.term(0)?, rule)?;
				let (left, right) = disjunction.sides().ok_or_else(inapplicable)?;
				let (left, right) = (left.clone(), right.clone());
				let children = next.add_premises(node, vec![disjunction, goal.clone(), goal.clone()]);
				next.assume(children[1], left);
				next.assume(children[2], right);
			},
			ImpliesIntro => {
				let (antecedent, consequent) = goal.sides().ok_or_else(inapplicable)?;
				let children = next.add_premises(node, vec![consequent.clone()]);
				next.assume(children[0], antecedent.clone());
			},
			ImpliesElim => {
				let antecedent = parse_formula(required_input(input)?.term(0)?)?;
				let implication = Formula::implication(antecedent.clone(), goal.clone());
				next.add_premises(node, vec![implication, antecedent]);
			},
			NotIntro => {
				let negated = goal.without_negations(1).ok_or_else(inapplicable)?;
				let children = next.add_premises(node, vec![Formula::bottom()]);
				next.assume(children[0], negated);
			},
			NotElim => {
				let formula = parse_formula(required_input(input)?.term(0)?)?;
				let negation = Formula::negation(formula.clone());
				next.add_premises(node, vec![formula, negation]);
			},
			FalsumElim => {
				next.add_premises(node, vec![Formula::bottom()]);
			},
			Reductio => {
				let children = next.add_premises(node, vec![Formula::bottom()]);
				next.assume(children[0], Formula::negation(goal.clone()));
			},
			TopIntro => next.close(node, rule.to_string()),
			ExistsIntro => {
				let (variable, operand) = goal.quantified().ok_or_else(inapplicable)?;
				let term = required_input(input)?.term(0)?;
				parse_term(term)?;
				let instance = instantiate(operand, variable, term)?;
				next.add_premises(node, vec![instance]);
				next.tree[node].substitution = Some(Substitution::new(variable, term));
			},
			ForallIntro => {
				let (variable, operand) = goal.quantified().ok_or_else(inapplicable)?;
				let eigenvariable = required_input(input)?.term(0)?;
				let visible = self.visible_hypotheses(node);
				ensure_fresh(eigenvariable, visible.iter().map(|h| &h.formula).chain(std::iter::once(goal)))?;
				let instance = instantiate(operand, variable, eigenvariable)?;
				next.add_premises(node, vec![instance]);
				next.tree[node].substitution = Some(Substitution::new(variable, eigenvariable));
			},
			ForallElim => {
				let input = required_input(input)?;
				let universal = parse_checked(input.term(0)?, rule)?;
				let term = input.term(1)?;
				parse_term(term)?;
				let (variable, operand) = universal.quantified().ok_or_else(inapplicable)?;
				let instance = instantiate(operand, variable, term)?;
				if !structural_equals(&instance, goal) {
					return Err(mismatch(format!(
						"`{}` with {}/{} gives `{}`, not `{}`",
						universal, variable, term, instance, goal
					)));
				}
				next.tree[node].substitution = Some(Substitution::new(variable, term));
				next.add_premises(node, vec![universal]);
			},
			ExistsElim => {
				let input = required_input(input)?;
				let existential = parse_checked(input.term(0)?, rule)?;
				let eigenvariable = input.term(1)?;
				let visible = self.visible_hypotheses(node);
				let context = visible
					.iter()
					.map(|h| &h.formula)
					.chain(std::iter::once(goal))
					.chain(std::iter::once(&existential));
				ensure_fresh(eigenvariable, context)?;

				let (variable, operand) = existential.quantified().ok_or_else(inapplicable)?;
				let case = instantiate(operand, variable, eigenvariable)?;
				let substitution = Substitution::new(variable, eigenvariable);
				let children = next.add_premises(node, vec![existential.clone(), goal.clone()]);
				next.assume(children[1], case);
				next.tree[node].substitution = Some(substitution);
			},
			EqualityElimLeft | EqualityElimRight => {
				let equation = parse_checked(required_input(input)?.term(0)?, rule)?;
				let (left, right) = equation.sides().ok_or_else(inapplicable)?;
				// =E1: из a=b и P(a) следует P(b), поэтому в цели b меняется обратно на a
				let (from, to) = if rule == EqualityElimLeft { (right, left) } else { (left, right) };
				let from = formula_to_string(from, false);
				let mut premise = goal.clone();
				if substitute_first(&mut premise, &from, &formula_to_string(to, false))? == 0 {
					return Err(mismatch(format!("`{}` does not occur in `{}`", from, goal)));
				}
				next.add_premises(node, vec![equation, premise]);
			},
			EqualityIntro => {
				let (left, right) = goal.sides().ok_or_else(inapplicable)?;
				if structural_equals(left, right) {
					next.close(node, "reflexivity".to_string());
				} else {
					let instance = parse_checked(required_input(input)?.term(0)?, rule)?;
					let from = formula_to_string(left, false);
					let mut other = instance.clone();
					if substitute_first(&mut other, &from, &formula_to_string(right, false))? == 0 {
						return Err(mismatch(format!("`{}` does not occur in `{}`", from, instance)));
					}
					next.add_premises(node, vec![instance, other]);
				}
			},
			Close => {
				let justification = self.closing_justification(node, goal).ok_or_else(inapplicable)?;
				next.close(node, justification);
			},
		}

		next.tree[node].rule = Some(rule);
		Ok(next)
	}

	fn clear_selection(&mut self) {
		self.side = None;
	}
}

impl GentzenProof {
	fn fmt_node(&self, f: &mut fmt::Formatter, node: NodeIndex) -> fmt::Result {
		let conclusion = &self.tree[node];
		let marker = if self.side == Some(node) { "*" } else { " " };
		write!(f, "{}{}[{}] {}", marker, "  ".repeat(conclusion.level), node.index(), conclusion.formula)?;
		if let Some(rule) = conclusion.rule {
			write!(f, "    {}", rule)?;
		}
		if let Some(substitution) = &conclusion.substitution {
			write!(f, " {}", substitution)?;
		}
		if let Some(justification) = &conclusion.justification {
			write!(f, " ({})", justification)?;
		}
		if conclusion.closed {
			write!(f, " ✓")?;
		}
		writeln!(f)?;

		for child in self.children(node) {
			self.fmt_node(f, child)?;
		}
		Ok(())
	}
}

impl fmt::Display for GentzenProof {
	fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
		self.fmt_node(f, self.root)?;
		if !self.hypotheses.is_empty() {
			writeln!(f, "hypotheses:")?;
			for hypothesis in &self.hypotheses {
				writeln!(
					f,
					"  {}    level {}, above [{}]",
					hypothesis.formula,
					hypothesis.level,
					hypothesis.scope.index()
				)?;
			}
		}
		Ok(())
	}
}
