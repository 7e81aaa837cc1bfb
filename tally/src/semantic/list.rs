use super::error::ErrorValue;
use super::SemanticValue;
use crate::units::Quantity;

#[derive(Debug, Clone, PartialEq, Default)]
pub struct ListValue {
    items: Vec<SemanticValue>,
}

impl ListValue {
    /// Validate and build a list.
    ///
    /// At most `max_length` items. If any item is a quantity, every quantity must
    /// share its dimensions and bare numbers take the first quantity's unit.
    pub fn new(items: Vec<SemanticValue>, max_length: usize) -> Result<Self, ErrorValue> {
        if items.len() > max_length {
            return Err(ErrorValue::runtime(format!(
                "List has {} items; the limit is {}",
                items.len(),
                max_length
            )));
        }
        if let Some(error) = items.iter().find_map(|v| match v {
            SemanticValue::Error(e) => Some(e.clone()),
            _ => None,
        }) {
            return Err(error);
        }

        let reference = items.iter().find_map(|v| match v {
            SemanticValue::Unit(q) => Some(q.unit.clone()),
            _ => None,
        });
        let Some(reference) = reference else {
            return Ok(Self { items });
        };

        let items = items
            .into_iter()
            .map(|item| match item {
                SemanticValue::Number(n) => Ok(SemanticValue::Unit(Quantity::new(n, reference.clone()))),
                SemanticValue::Unit(q) if q.dimension() == reference.dimension() => {
                    Ok(SemanticValue::Unit(q))
                }
                SemanticValue::Unit(q) => Err(ErrorValue::semantic(format!(
                    "List mixes '{}' with '{}'; all quantities must share dimensions",
                    q.unit.label(),
                    reference.label()
                ))),
                other => Err(ErrorValue::type_mismatch(
                    "Lists of quantities can only hold quantities and numbers",
                    "unit",
                    other.value_type().name(),
                )),
            })
            .collect::<Result<Vec<_>, _>>()?;
        Ok(Self { items })
    }

    pub fn items(&self) -> &[SemanticValue] {
        &self.items
    }

    pub fn len(&self) -> usize {
        self.items.len()
    }

    pub fn is_empty(&self) -> bool {
        self.items.is_empty()
    }

    pub fn get(&self, index: i64) -> Option<&SemanticValue> {
        let resolved = if index < 0 {
            self.items.len() as i64 + index
        } else {
            index
        };
        usize::try_from(resolved).ok().and_then(|i| self.items.get(i))
    }

    /// Elements in `start..end`; negative bounds count from the end
    pub fn slice(&self, start: Option<i64>, end: Option<i64>) -> ListValue {
        let len = self.items.len() as i64;
        let clamp = |i: i64| -> usize {
            let i = if i < 0 { len + i } else { i };
            i.clamp(0, len) as usize
        };
        let from = start.map_or(0, clamp);
        let to = end.map_or(self.items.len(), clamp);
        let items = if from < to {
            self.items[from..to].to_vec()
        } else {
            Vec::new()
        };
        Self { items }
    }
}
