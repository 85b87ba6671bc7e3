use crate::expr::*;
use crate::parsing::{parse_replacement, ParseError};
use crate::render::formula_to_string;
use itertools::Itertools;
use serde::{Deserialize, Serialize};
use std::fmt;

/// `variable/term`, запись о том какой терм подставили вместо связанной переменной.
#[derive(Clone, Debug, Eq, PartialEq, Hash, Serialize, Deserialize)]
pub struct Substitution {
	pub variable: String,
	pub term: String,
}

impl Substitution {
	pub fn new(variable: &str, term: &str) -> Substitution {
		Substitution {
			variable: variable.to_string(),
			term: term.trim().to_string(),
		}
	}
}

impl fmt::Display for Substitution {
	fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
		write!(f, "{}/{}", self.variable, self.term)
	}
}

fn without_whitespace(text: &str) -> String {
	text.chars().filter(|c| !c.is_whitespace()).collect()
}

/// Собирает в прямом порядке обхода имена переменных, констант, чисел, нульарных отношений
/// и отрисованные применения `f(x)`, `P(x)`, `s(x)`. Без повторов, в порядке первого появления.
pub fn extract_constants_or_variables(formula: &Formula) -> Vec<String> {
	let mut found = Vec::new();
	collect_names(formula, &mut found);
	found.into_iter().unique().collect()
}

fn collect_names(formula: &Formula, found: &mut Vec<String>) {
	use Formula::*;

	match formula {
		Variable { name } => found.push(name.clone()),
		Constant { value } | Number { value } => found.push(value.clone()),
		Atom { value } => {
			if value != TOP && value != BOTTOM {
				found.push(value.clone());
			}
		},
		Predicate { terms, .. } | Function { terms, .. } => {
			found.push(formula_to_string(formula, false));
			for term in terms {
				collect_names(term, found);
			}
		},
		Successor { term } => {
			found.push(formula_to_string(formula, false));
			collect_names(term, found);
		},
		Negation { operand, .. } | Forall { operand, .. } | Exists { operand, .. } => collect_names(operand, found),
		Parenthesis { value } => collect_names(value, found),
		Conjunction { left, right } |
		Disjunction { left, right } |
		Implication { left, right } |
		Addition { left, right } |
		Multiplication { left, right } |
		Equality { left, right, .. } => {
			collect_names(left, found);
			collect_names(right, found);
		},
		Sequent { premises, conclusion } => {
			for premise in premises {
				collect_names(premise, found);
			}
			collect_names(conclusion, found);
		},
	}
}

/// Совпадает ли узел с целью подстановки. Имена сравниваются как строки, применения по
/// отрисованному тексту без пробелов.
fn matches_target(formula: &Formula, target: &str) -> bool {
	use Formula::*;

	match formula {
		Variable { name } => name == target,
		Constant { value } | Number { value } => value == target,
		Atom { value } => value != TOP && value != BOTTOM && value == target,
		Function { .. } | Predicate { .. } | Successor { .. } => {
			without_whitespace(&formula_to_string(formula, false)) == without_whitespace(target)
		},
		_ => false,
	}
}

/// Параметры одного прохода подстановки.
struct Rewrite<'a> {
	target: &'a str,
	replacement: &'a Formula,
	limit: Option<usize>,
	/// Не заходить под квантор, который заново связывает `target`.
	free_only: bool,
}

fn substitute(formula: &mut Formula, rewrite: &Rewrite, count: &mut usize) {
	use Formula::*;
	let Rewrite { target, replacement, limit, free_only } = *rewrite;

	if limit.map(|limit| *count >= limit).unwrap_or(false) {
		return;
	}

	if matches_target(formula, target) {
		*formula = replacement.clone();
		*count += 1;
		return;
	}

	match formula {
		Atom { .. } | Variable { .. } | Constant { .. } | Number { .. } => {},
		Predicate { terms, .. } | Function { terms, .. } => {
			for term in terms {
				substitute(term, rewrite, count);
			}
		},
		Successor { term } => substitute(term, rewrite, count),
		Negation { operand, .. } => substitute(operand, rewrite, count),
		Forall { variable, operand } | Exists { variable, operand } => {
			if !(free_only && variable.as_str() == target) {
				substitute(operand, rewrite, count)
			}
		},
		Parenthesis { value } => substitute(value, rewrite, count),
		Conjunction { left, right } |
		Disjunction { left, right } |
		Implication { left, right } |
		Addition { left, right } |
		Multiplication { left, right } |
		Equality { left, right, .. } => {
			substitute(left, rewrite, count);
			substitute(right, rewrite, count);
		},
		Sequent { premises, conclusion } => {
			for premise in premises {
				substitute(premise, rewrite, count);
			}
			substitute(conclusion, rewrite, count);
		},
	}
}

/// Заменяет первое в прямом порядке вхождение `target` на перечитанный `replacement`.
/// Возвращает число заменённых узлов.
pub fn substitute_first(formula: &mut Formula, target: &str, replacement: &str) -> Result<usize, ParseError> {
	let replacement = parse_replacement(replacement)?;
	let rewrite = Rewrite { target, replacement: &replacement, limit: Some(1), free_only: false };
	let mut count = 0;
	substitute(formula, &rewrite, &mut count);
	Ok(count)
}

pub fn substitute_all(formula: &mut Formula, target: &str, replacement: &str) -> Result<usize, ParseError> {
	let replacement = parse_replacement(replacement)?;
	let rewrite = Rewrite { target, replacement: &replacement, limit: None, free_only: false };
	let mut count = 0;
	substitute(formula, &rewrite, &mut count);
	Ok(count)
}

/// `φ[t/x]` на копии `φ`: заменяются все свободные вхождения `x`, а не только первое,
/// иначе `∀x P(x,x)` дал бы `P(c,x)`. Под квантором по тому же `x` замена не идёт.
pub fn instantiate(operand: &Formula, variable: &str, term: &str) -> Result<Formula, ParseError> {
	let replacement = parse_replacement(term)?;
	let rewrite = Rewrite { target: variable, replacement: &replacement, limit: None, free_only: true };
	let mut instance = operand.clone();
	substitute(&mut instance, &rewrite, &mut 0);
	Ok(instance)
}

/// Встречается ли имя или отрисованный терм среди формул.
pub fn occurs_in<'a, I: IntoIterator<Item = &'a Formula>>(name: &str, formulas: I) -> bool {
	let name = without_whitespace(name);
	formulas
		.into_iter()
		.any(|formula| extract_constants_or_variables(formula).iter().any(|found| without_whitespace(found) == name))
}
