use crate::expr::*;
use itertools::Itertools;
use std::fmt;

/// Приоритеты по возрастанию: чем больше, тем сильнее связывает.
fn precedence(formula: &Formula) -> u8 {
	use Formula::*;

	match formula {
		Sequent { .. } => 0,
		Implication { .. } => 1,
		Disjunction { .. } => 2,
		Conjunction { .. } => 3,
		Negation { .. } => 4,
		Forall { .. } | Exists { .. } => 5,
		Equality { .. } => 6,
		Addition { .. } => 7,
		Multiplication { .. } => 8,
		Predicate { .. } | Function { .. } | Successor { .. } => 9,
		Parenthesis { .. } | Atom { .. } | Variable { .. } | Constant { .. } | Number { .. } => 10,
	}
}

fn binary_parts(formula: &Formula) -> Option<(&'static str, &Formula, &Formula)> {
	use Formula::*;

	match formula {
		Conjunction { left, right } => Some(("∧", &**left, &**right)),
		Disjunction { left, right } => Some(("∨", &**left, &**right)),
		Implication { left, right } => Some(("⇒", &**left, &**right)),
		Addition { left, right } => Some(("+", &**left, &**right)),
		Multiplication { left, right } => Some(("*", &**left, &**right)),
		_ => None,
	}
}

#[derive(Clone, Copy, PartialEq, Eq)]
enum Position {
	Left,
	Right,
	Operand,
}

/// Печать формулы. `full_parens` ставит скобки вокруг каждого составного подвыражения,
/// иначе скобки расставляются по таблице приоритетов.
pub fn formula_to_string(formula: &Formula, full_parens: bool) -> String {
	if full_parens {
		render_full(formula.strip_parens())
	} else {
		render_minimal(formula.strip_parens())
	}
}

fn needs_no_parens(formula: &Formula) -> bool {
	use Formula::*;

	formula.is_leaf() || matches!(formula, Predicate { .. } | Function { .. } | Successor { .. })
}

fn full_child(child: &Formula) -> String {
	let child = child.strip_parens();
	if needs_no_parens(child) {
		render_full(child)
	} else {
		format!("({})", render_full(child))
	}
}

fn render_full(formula: &Formula) -> String {
	use Formula::*;

	if let Some((op, left, right)) = binary_parts(formula) {
		return format!("{}{}{}", full_child(left), op, full_child(right));
	}

	match formula {
		Atom { value } | Constant { value } | Number { value } => value.clone(),
		Variable { name } => name.clone(),
		Negation { operand, count } => format!("{}{}", "¬".repeat(*count), full_child(operand)),
		Forall { variable, operand } => quantifier_full("∀", variable, operand),
		Exists { variable, operand } => quantifier_full("∃", variable, operand),
		Equality { operator, left, right } => format!("{}{}{}", full_child(left), operator, full_child(right)),
		Predicate { name, terms } | Function { name, terms } => {
			format!("{}({})", name, terms.iter().map(|t| render_full(t.strip_parens())).join(","))
		},
		Successor { term } => format!("s({})", render_full(term.strip_parens())),
		Parenthesis { value } => render_full(value.strip_parens()),
		Sequent { premises, conclusion } => render_sequent(premises, conclusion, true),
		Conjunction { .. } | Disjunction { .. } | Implication { .. } | Addition { .. } | Multiplication { .. } => {
			unreachable!("binary nodes are handled above")
		},
	}
}

fn quantifier_full(symbol: &str, variable: &str, operand: &Formula) -> String {
	let operand = operand.strip_parens();
	if needs_no_parens(operand) {
		format!("{}{} {}", symbol, variable, render_full(operand))
	} else {
		format!("{}{}({})", symbol, variable, render_full(operand))
	}
}

fn render_sequent(premises: &[Formula], conclusion: &Formula, full_parens: bool) -> String {
	let premises = premises.iter().map(|p| formula_to_string(p, full_parens)).join(", ");
	let conclusion = formula_to_string(conclusion, full_parens);
	if premises.is_empty() {
		format!("⊢ {}", conclusion)
	} else {
		format!("{} ⊢ {}", premises, conclusion)
	}
}

/// Нужны ли скобки вокруг ребёнка узла `parent` с приоритетом `parent_precedence`.
fn minimal_child(child: &Formula, parent: &Formula, position: Position) -> String {
	let explicit = matches!(child, Formula::Parenthesis { .. });
	let inner = child.strip_parens();
	let child_precedence = precedence(inner);
	let parent_precedence = precedence(parent);
	let is_implication = matches!(parent, Formula::Implication { .. });

	let parens = child_precedence < parent_precedence
		|| (child_precedence == parent_precedence
			&& match position {
				// грамматика левоассоциативна, справа одинаковый приоритет меняет смысл
				Position::Right => true,
				Position::Left => is_implication && explicit,
				Position::Operand => false,
			});

	if parens {
		format!("({})", render_minimal(inner))
	} else {
		render_minimal(inner)
	}
}

fn render_minimal(formula: &Formula) -> String {
	use Formula::*;

	if let Some((op, left, right)) = binary_parts(formula) {
		return format!(
			"{}{}{}",
			minimal_child(left, formula, Position::Left),
			op,
			minimal_child(right, formula, Position::Right)
		);
	}

	match formula {
		Atom { value } | Constant { value } | Number { value } => value.clone(),
		Variable { name } => name.clone(),
		Negation { operand, count } => {
			format!("{}{}", "¬".repeat(*count), minimal_child(operand, formula, Position::Operand))
		},
		Forall { variable, operand } | Exists { variable, operand } => {
			let symbol = if let Forall { .. } = formula { "∀" } else { "∃" };
			let body = minimal_child(operand, formula, Position::Operand);
			if body.starts_with('(') {
				format!("{}{}{}", symbol, variable, body)
			} else {
				format!("{}{} {}", symbol, variable, body)
			}
		},
		Equality { operator, left, right } => format!(
			"{}{}{}",
			minimal_child(left, formula, Position::Left),
			operator,
			minimal_child(right, formula, Position::Right)
		),
		Predicate { name, terms } | Function { name, terms } => {
			format!("{}({})", name, terms.iter().map(|t| render_minimal(t.strip_parens())).join(","))
		},
		Successor { term } => format!("s({})", render_minimal(term.strip_parens())),
		Parenthesis { value } => render_minimal(value.strip_parens()),
		Sequent { premises, conclusion } => render_sequent(premises, conclusion, false),
		Conjunction { .. } | Disjunction { .. } | Implication { .. } | Addition { .. } | Multiplication { .. } => {
			unreachable!("binary nodes are handled above")
		},
	}
}

/// Простая печать без учёта приоритетов: скобки только там, где они были в дереве,
/// кванторы всегда со скобками. Результат снова читается парсером.
pub fn convert_to_logical_expression(formula: &Formula) -> String {
	use Formula::*;

	if let Some((op, left, right)) = binary_parts(formula) {
		return format!("{}{}{}", convert_to_logical_expression(left), op, convert_to_logical_expression(right));
	}

	match formula {
		Atom { value } | Constant { value } | Number { value } => value.clone(),
		Variable { name } => name.clone(),
		Negation { operand, count } => format!("{}{}", "¬".repeat(*count), convert_to_logical_expression(operand)),
		Forall { variable, operand } => {
			format!("∀{}({})", variable, convert_to_logical_expression(operand.strip_parens()))
		},
		Exists { variable, operand } => {
			format!("∃{}({})", variable, convert_to_logical_expression(operand.strip_parens()))
		},
		Equality { operator, left, right } => format!(
			"{}{}{}",
			convert_to_logical_expression(left),
			operator,
			convert_to_logical_expression(right)
		),
		Predicate { name, terms } | Function { name, terms } => {
			format!("{}({})", name, terms.iter().map(convert_to_logical_expression).join(","))
		},
		Successor { term } => format!("s({})", convert_to_logical_expression(term)),
		Parenthesis { value } => format!("({})", convert_to_logical_expression(value)),
		Sequent { premises, conclusion } => format!(
			"{}⊢{}",
			premises.iter().map(convert_to_logical_expression).join(","),
			convert_to_logical_expression(conclusion)
		),
		Conjunction { .. } | Disjunction { .. } | Implication { .. } | Addition { .. } | Multiplication { .. } => {
			unreachable!("binary nodes are handled above")
		},
	}
}

impl fmt::Display for Formula {
	fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
		write!(f, "{}", formula_to_string(self, false))
	}
}
