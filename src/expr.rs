use serde::{Deserialize, Serialize};
use std::fmt;

pub const TOP: &str = "⊤";
pub const BOTTOM: &str = "⊥";

/// Оператор в равенстве: `=` или `≠`.
#[derive(Clone, Copy, Debug, Eq, PartialEq, Ord, PartialOrd, Hash, Serialize, Deserialize)]
pub enum EqualityOperator {
	Equal,
	NotEqual,
}

impl fmt::Display for EqualityOperator {
	fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
		match self {
			EqualityOperator::Equal => write!(f, "="),
			EqualityOperator::NotEqual => write!(f, "≠"),
		}
	}
}

/// Узел формулы или терма. Тип узла полностью определяет его поля, дети принадлежат родителю.
#[derive(Clone, Debug, Eq, PartialEq, Ord, PartialOrd, Hash, Serialize, Deserialize)]
pub enum Formula {
	/// `⊤`, `⊥` или пропозициональная буква `A`.
	Atom {
		value: String,
	},

	/// `x`, `y1`, `z'`.
	Variable {
		name: String,
	},

	/// `a`, `c`, `zero`.
	Constant {
		value: String,
	},

	/// `0`, `12`. Хранится строкой, подстановка сравнивает литералы.
	Number {
		value: String,
	},

	/// `¬¬A`: несколько отрицаний подряд схлопываются в один узел.
	Negation {
		operand: Box<Formula>,
		count: usize,
	},

	Conjunction {
		left: Box<Formula>,
		right: Box<Formula>,
	},

	Disjunction {
		left: Box<Formula>,
		right: Box<Formula>,
	},

	Implication {
		left: Box<Formula>,
		right: Box<Formula>,
	},

	/// `∀x φ`. Переменная всегда просто имя, а не узел.
	Forall {
		variable: String,
		operand: Box<Formula>,
	},

	Exists {
		variable: String,
		operand: Box<Formula>,
	},

	Equality {
		operator: EqualityOperator,
		left: Box<Formula>,
		right: Box<Formula>,
	},

	/// `P(t1, ..., tn)`. Старая форма `relation` схлопнута сюда при парсинге.
	Predicate {
		name: String,
		terms: Vec<Formula>,
	},

	/// `f(t1, ..., tn)`.
	Function {
		name: String,
		terms: Vec<Formula>,
	},

	/// `s(t)`.
	Successor {
		term: Box<Formula>,
	},

	Addition {
		left: Box<Formula>,
		right: Box<Formula>,
	},

	Multiplication {
		left: Box<Formula>,
		right: Box<Formula>,
	},

	/// Явные скобки из исходного текста. Семантически прозрачны, нужны только для печати.
	Parenthesis {
		value: Box<Formula>,
	},

	/// `Γ ⊢ φ` как одна формула.
	Sequent {
		premises: Vec<Formula>,
		conclusion: Box<Formula>,
	},
}

#[derive(Clone, Debug, Eq, PartialEq, Ord, PartialOrd, Hash, Copy, Serialize, Deserialize)]
pub enum FormulaKind {
	Atom,
	Variable,
	Constant,
	Number,
	Negation,
	Conjunction,
	Disjunction,
	Implication,
	Forall,
	Exists,
	Equality,
	Predicate,
	Function,
	Successor,
	Addition,
	Multiplication,
	Parenthesis,
	Sequent,
}

impl From<&Formula> for FormulaKind {
	fn from(formula: &Formula) -> Self {
		use Formula::*;

		match formula {
			Atom { .. } => FormulaKind::Atom,
			Variable { .. } => FormulaKind::Variable,
			Constant { .. } => FormulaKind::Constant,
			Number { .. } => FormulaKind::Number,
			Negation { .. } => FormulaKind::Negation,
			Conjunction { .. } => FormulaKind::Conjunction,
			Disjunction { .. } => FormulaKind::Disjunction,
			Implication { .. } => FormulaKind::Implication,
			Forall { .. } => FormulaKind::Forall,
			Exists { .. } => FormulaKind::Exists,
			Equality { .. } => FormulaKind::Equality,
			Predicate { .. } => FormulaKind::Predicate,
			Function { .. } => FormulaKind::Function,
			Successor { .. } => FormulaKind::Successor,
			Addition { .. } => FormulaKind::Addition,
			Multiplication { .. } => FormulaKind::Multiplication,
			Parenthesis { .. } => FormulaKind::Parenthesis,
			Sequent { .. } => FormulaKind::Sequent,
		}
	}
}

impl Formula {
	pub fn atom(value: &str) -> Formula {
		Formula::Atom { value: value.to_string() }
	}

	pub fn top() -> Formula {
		Formula::atom(TOP)
	}

	pub fn bottom() -> Formula {
		Formula::atom(BOTTOM)
	}

	pub fn kind(&self) -> FormulaKind {
		FormulaKind::from(self)
	}

	/// Снимает все внешние скобки. Идемпотентна.
	pub fn strip_parens(&self) -> &Formula {
		let mut current = self;
		while let Formula::Parenthesis { value } = current {
			current = &**value;
		}
		current
	}

	pub fn into_stripped(self) -> Formula {
		match self {
			Formula::Parenthesis { value } => value.into_stripped(),
			other => other,
		}
	}

	/// Оборачивает в скобки, если узел ещё не скобки. Так же строятся формулы из текста `(A)∧(B)`.
	pub fn parenthesized(self) -> Formula {
		match self {
			paren @ Formula::Parenthesis { .. } => paren,
			other => Formula::Parenthesis { value: Box::new(other) },
		}
	}

	pub fn conjunction(left: Formula, right: Formula) -> Formula {
		Formula::Conjunction {
			left: Box::new(left.parenthesized()),
			right: Box::new(right.parenthesized()),
		}
	}

	pub fn disjunction(left: Formula, right: Formula) -> Formula {
		Formula::Disjunction {
			left: Box::new(left.parenthesized()),
			right: Box::new(right.parenthesized()),
		}
	}

	pub fn implication(left: Formula, right: Formula) -> Formula {
		Formula::Implication {
			left: Box::new(left.parenthesized()),
			right: Box::new(right.parenthesized()),
		}
	}

	pub fn negation(operand: Formula) -> Formula {
		Formula::Negation {
			operand: Box::new(operand.parenthesized()),
			count: 1,
		}
	}

	pub fn is_top(&self) -> bool {
		matches!(self.strip_parens(), Formula::Atom { value } if value == TOP)
	}

	pub fn is_bottom(&self) -> bool {
		matches!(self.strip_parens(), Formula::Atom { value } if value == BOTTOM)
	}

	/// Листья дерева: у них нет детей.
	pub fn is_leaf(&self) -> bool {
		matches!(
			self,
			Formula::Atom { .. } | Formula::Variable { .. } | Formula::Constant { .. } | Formula::Number { .. }
		)
	}

	/// Суммарное число отрицаний сверху (сквозь скобки) и то, что под ними.
	pub fn negation_parts(&self) -> (usize, &Formula) {
		let mut total = 0;
		let mut current = self.strip_parens();
		while let Formula::Negation { operand, count } = current {
			total += count;
			current = operand.strip_parens();
		}
		(total, current)
	}

	/// Снимает ровно `n` отрицаний. `None`, если их меньше.
	pub fn without_negations(&self, n: usize) -> Option<Formula> {
		let (total, core) = self.negation_parts();
		if total < n {
			return None;
		}
		let rest = total - n;
		Some(if rest == 0 {
			core.clone()
		} else {
			Formula::Negation { operand: Box::new(core.clone().parenthesized()), count: rest }
		})
	}

	/// `self` является отрицанием `other`.
	pub fn negates(&self, other: &Formula) -> bool {
		let (count, core) = self.negation_parts();
		let (other_count, other_core) = other.negation_parts();
		count == other_count + 1 && structural_equals(core, other_core)
	}

	/// Для `∀x φ` и `∃x φ` возвращает `(x, φ)`.
	pub fn quantified(&self) -> Option<(&str, &Formula)> {
		match self.strip_parens() {
			Formula::Forall { variable, operand } | Formula::Exists { variable, operand } => {
				Some((variable.as_str(), &**operand))
			},
			_ => None,
		}
	}

	/// Левая и правая части бинарной связки или операции.
	pub fn sides(&self) -> Option<(&Formula, &Formula)> {
		use Formula::*;

		match self.strip_parens() {
			Conjunction { left, right } |
			Disjunction { left, right } |
			Implication { left, right } |
			Addition { left, right } |
			Multiplication { left, right } |
			Equality { left, right, .. } => Some((&**left, &**right)),
			_ => None,
		}
	}
}

fn both<F: Fn(&Formula, &Formula) -> bool>(a: &[Formula], b: &[Formula], eq: F) -> bool {
	a.len() == b.len() && a.iter().zip(b.iter()).all(|(a, b)| eq(a, b))
}

/// Структурное равенство после снятия скобок. `∧` и `∨` сравниваются коммутативно,
/// всё остальное позиционно. Связанные переменные сравниваются по имени, без α-эквивалентности.
pub fn structural_equals(a: &Formula, b: &Formula) -> bool {
	use Formula::*;

	let a = a.strip_parens();
	let b = b.strip_parens();

	match (a, b) {
		(Negation { .. }, _) | (_, Negation { .. }) => {
			let (a_count, a_core) = a.negation_parts();
			let (b_count, b_core) = b.negation_parts();
			a_count == b_count && structural_equals(a_core, b_core)
		},

		(Atom { value: a }, Atom { value: b }) |
		(Constant { value: a }, Constant { value: b }) |
		(Number { value: a }, Number { value: b }) |
		(Variable { name: a }, Variable { name: b }) => a == b,

		(Conjunction { left: al, right: ar }, Conjunction { left: bl, right: br }) |
		(Disjunction { left: al, right: ar }, Disjunction { left: bl, right: br }) => {
			(structural_equals(al, bl) && structural_equals(ar, br))
				|| (structural_equals(al, br) && structural_equals(ar, bl))
		},

		(Implication { left: al, right: ar }, Implication { left: bl, right: br }) |
		(Addition { left: al, right: ar }, Addition { left: bl, right: br }) |
		(Multiplication { left: al, right: ar }, Multiplication { left: bl, right: br }) => {
			structural_equals(al, bl) && structural_equals(ar, br)
		},

		(
			Equality { operator: a_op, left: al, right: ar },
			Equality { operator: b_op, left: bl, right: br },
		) => a_op == b_op && structural_equals(al, bl) && structural_equals(ar, br),

		(Forall { variable: av, operand: ao }, Forall { variable: bv, operand: bo }) |
		(Exists { variable: av, operand: ao }, Exists { variable: bv, operand: bo }) => {
			av == bv && structural_equals(ao, bo)
		},

		(Predicate { name: an, terms: at }, Predicate { name: bn, terms: bt }) |
		(Function { name: an, terms: at }, Function { name: bn, terms: bt }) => {
			an == bn && both(at, bt, structural_equals)
		},

		(Successor { term: a }, Successor { term: b }) => structural_equals(a, b),

		(
			Sequent { premises: ap, conclusion: ac },
			Sequent { premises: bp, conclusion: bc },
		) => both(ap, bp, structural_equals) && structural_equals(ac, bc),

		_ => false,
	}
}

/// Есть ли в списке формула, структурно равная данной.
pub fn contains_formula(formulas: &[Formula], formula: &Formula) -> bool {
	formulas.iter().any(|f| structural_equals(f, formula))
}
