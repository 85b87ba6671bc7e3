/// Снимки состояния для «назад/вперёд». Каждый шаг это O(1).
#[derive(Clone, Debug, Eq, PartialEq)]
pub struct History {
	snapshots: Vec<String>,
	position: usize,
}

impl History {
	pub fn new(initial: String) -> History {
		History {
			snapshots: vec![initial],
			position: 0,
		}
	}

	/// Новый снимок отбрасывает всё, что было после текущей позиции.
	pub fn checkpoint(&mut self, snapshot: String) {
		self.snapshots.truncate(self.position + 1);
		self.snapshots.push(snapshot);
		self.position += 1;
	}

	pub fn current(&self) -> &str {
		&self.snapshots[self.position]
	}

	pub fn undo(&mut self) -> Option<&str> {
		if self.position == 0 {
			return None;
		}
		self.position -= 1;
		Some(self.current())
	}

	pub fn redo(&mut self) -> Option<&str> {
		if self.position + 1 >= self.snapshots.len() {
			return None;
		}
		self.position += 1;
		Some(self.current())
	}

	pub fn len(&self) -> usize {
		self.snapshots.len()
	}

	pub fn is_empty(&self) -> bool {
		self.snapshots.is_empty()
	}

	pub fn position(&self) -> usize {
		self.position
	}
}
