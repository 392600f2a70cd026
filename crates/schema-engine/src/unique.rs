//! `uniqueItems` duplicate detection, switching strategy by array size (§4.G, §4.H).
use std::hash::{Hash, Hasher};

use ahash::{AHashSet, AHasher};
use serde_json::Value;

use crate::equal::equal;

struct HashedValue<'a>(&'a Value);

impl PartialEq for HashedValue<'_> {
    fn eq(&self, other: &Self) -> bool {
        equal(self.0, other.0)
    }
}

impl Eq for HashedValue<'_> {}

impl Hash for HashedValue<'_> {
    fn hash<H: Hasher>(&self, state: &mut H) {
        match self.0 {
            Value::Null => state.write_u32(3_221_225_473),
            Value::Bool(item) => item.hash(state),
            Value::Number(item) => {
                if let Some(number) = item.as_f64() {
                    number.to_bits().hash(state);
                } else if let Some(number) = item.as_u64() {
                    number.hash(state);
                } else if let Some(number) = item.as_i64() {
                    number.hash(state);
                }
            }
            Value::String(item) => item.hash(state),
            Value::Array(items) => {
                for item in items {
                    HashedValue(item).hash(state);
                }
            }
            Value::Object(items) => {
                let mut hash = 0;
                for (key, value) in items {
                    let mut item_hasher = AHasher::default();
                    key.hash(&mut item_hasher);
                    HashedValue(value).hash(&mut item_hasher);
                    hash ^= item_hasher.finish();
                }
                state.write_u64(hash);
            }
        }
    }
}

/// Empirically chosen threshold past which hashing beats pairwise comparison.
const ITEMS_SIZE_THRESHOLD: usize = 15;

pub(crate) fn is_unique(items: &[Value]) -> bool {
    let size = items.len();
    if size <= 1 {
        true
    } else if let [first, second] = items {
        !equal(first, second)
    } else if let [first, second, third] = items {
        !equal(first, second) && !equal(first, third) && !equal(second, third)
    } else if size <= ITEMS_SIZE_THRESHOLD {
        let mut idx = 0_usize;
        while idx < items.len() {
            let mut inner_idx = idx + 1;
            while inner_idx < items.len() {
                if equal(&items[idx], &items[inner_idx]) {
                    return false;
                }
                inner_idx += 1;
            }
            idx += 1;
        }
        true
    } else {
        let mut seen = AHashSet::with_capacity(size);
        items.iter().map(HashedValue).all(move |x| seen.insert(x))
    }
}

#[cfg(test)]
mod tests {
    use super::is_unique;
    use serde_json::json;

    #[test]
    fn detects_duplicates_across_number_representations() {
        assert!(!is_unique(&[json!(1), json!(1.0)]));
        assert!(is_unique(&[json!(1), json!(2)]));
    }

    #[test]
    fn large_arrays_use_the_hashing_path() {
        let items: Vec<_> = (0..20).map(serde_json::Value::from).collect();
        assert!(is_unique(&items));
        let mut with_dup = items.clone();
        with_dup.push(json!(0));
        assert!(!is_unique(&with_dup));
    }
}
