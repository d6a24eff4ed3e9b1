//! The `full-text` indexer.
//!
//! The index map is an inverted index: each key is a lower-case word and
//! maps to the sorted ids of the documents whose indexed field contains it.
//! Only string fields and arrays of strings can be indexed.

use super::{IndexDescriptor, PotashIndexerProvider};
use crate::collection::PotashId;
use crate::common::{tokenize, FieldValues, Fields, PotashPlugin, PotashPluginProvider, Value, FULL_TEXT_INDEX};
use crate::errors::{ErrorKind, PotashError, PotashResult};
use crate::filter::{as_text_filter, Filter, TextQuery};
use crate::potash_config::PotashConfig;
use crate::store::{StagedWrite, StoreSnapshot, Table};
use itertools::Itertools;
use std::collections::HashMap;

#[derive(Clone, Default)]
pub(crate) struct FullTextIndexer;

impl FullTextIndexer {
    pub fn new() -> Self {
        FullTextIndexer
    }

    fn words(field_values: &FieldValues, index_descriptor: &IndexDescriptor) -> PotashResult<Vec<String>> {
        let words = match field_values.values().first() {
            None | Some(Value::Null) => Vec::new(),
            Some(Value::String(text)) => tokenize(text),
            Some(Value::Array(elements)) => {
                let mut words = Vec::new();
                for element in elements {
                    match element {
                        Value::String(text) => words.extend(tokenize(text)),
                        Value::Null => {}
                        other => return Err(Self::not_text(field_values, index_descriptor, other)),
                    }
                }
                words
            }
            Some(other) => return Err(Self::not_text(field_values, index_descriptor, other)),
        };
        Ok(words.into_iter().unique().collect())
    }

    fn not_text(field_values: &FieldValues, index_descriptor: &IndexDescriptor, value: &Value) -> PotashError {
        log::error!(
            "Cannot full-text index {} of document {}: {} is not text",
            index_descriptor.index_fields().first_field(),
            field_values.id(),
            value.type_name()
        );
        PotashError::new(
            &format!(
                "Full-text index on {} only accepts strings, found {}",
                index_descriptor.index_fields().first_field(),
                value.type_name()
            ),
            ErrorKind::IndexValidationError,
        )
    }

    fn id_list(map_name: &str, value: Option<&Value>) -> PotashResult<Vec<Value>> {
        match value {
            None => Ok(Vec::new()),
            Some(Value::Array(ids)) => Ok(ids.clone()),
            Some(other) => {
                log::error!("Full-text index {} holds a {} instead of an id list", map_name, other.type_name());
                Err(PotashError::new(
                    &format!("Full-text index {} is corrupted", map_name),
                    ErrorKind::Corruption,
                ))
            }
        }
    }

    /// Ids of documents holding a matching word, most matching words first.
    fn search(map_name: &str, table: &Table, query: &TextQuery) -> PotashResult<Vec<PotashId>> {
        let mut scores: HashMap<PotashId, usize> = HashMap::new();
        let mut score = |ids: &Value| -> PotashResult<()> {
            for id in Self::id_list(map_name, Some(ids))? {
                if let Some(id) = id.as_id() {
                    *scores.entry(*id).or_default() += 1;
                }
            }
            Ok(())
        };

        match query {
            TextQuery::AnyWord(words) => {
                for word in words {
                    if let Some(ids) = table.get(&Value::String(word.clone())) {
                        score(ids)?;
                    }
                }
            }
            TextQuery::Prefix(term) => {
                let start = Value::String(term.clone());
                for (key, ids) in table.range(start..) {
                    match key.as_str() {
                        Some(word) if word.starts_with(term.as_str()) => score(ids)?,
                        _ => break,
                    }
                }
            }
            TextQuery::Suffix(_) | TextQuery::Contains(_) => {
                for (key, ids) in table.iter() {
                    if key.as_str().is_some_and(|word| query.matches_word(word)) {
                        score(ids)?;
                    }
                }
            }
        }

        Ok(scores
            .into_iter()
            .sorted_by(|(a, a_score), (b, b_score)| b_score.cmp(a_score).then(a.cmp(b)))
            .map(|(id, _)| id)
            .collect())
    }
}

impl PotashPluginProvider for FullTextIndexer {
    fn initialize(&self, _config: PotashConfig) -> PotashResult<()> {
        Ok(())
    }

    fn close(&self) -> PotashResult<()> {
        Ok(())
    }

    fn as_plugin(&self) -> PotashPlugin {
        PotashPlugin::new(self.clone())
    }
}

impl PotashIndexerProvider for FullTextIndexer {
    fn index_type(&self) -> String {
        FULL_TEXT_INDEX.to_string()
    }

    fn is_unique(&self) -> bool {
        false
    }

    fn validate_index(&self, fields: &Fields) -> PotashResult<()> {
        if fields.is_compound() {
            log::error!("Full-text index cannot span fields {}", fields);
            return Err(PotashError::new(
                "Full-text index can only be created on a single field",
                ErrorKind::IndexValidationError,
            ));
        }
        Ok(())
    }

    fn drop_index(
        &self,
        staged: &mut StagedWrite,
        index_descriptor: &IndexDescriptor,
        _config: &PotashConfig,
    ) -> PotashResult<()> {
        staged.drop_map(&index_descriptor.index_map_name());
        Ok(())
    }

    fn write_index_entry(
        &self,
        staged: &mut StagedWrite,
        field_values: &FieldValues,
        index_descriptor: &IndexDescriptor,
        _config: &PotashConfig,
    ) -> PotashResult<()> {
        let map_name = index_descriptor.index_map_name();
        let id = Value::PotashId(field_values.id());

        for word in Self::words(field_values, index_descriptor)? {
            let key = Value::String(word);
            let mut ids = Self::id_list(&map_name, staged.get(&map_name, &key))?;
            if let Err(position) = ids.binary_search(&id) {
                ids.insert(position, id.clone());
                staged.put(&map_name, key, Value::Array(ids));
            }
        }
        Ok(())
    }

    fn remove_index_entry(
        &self,
        staged: &mut StagedWrite,
        field_values: &FieldValues,
        index_descriptor: &IndexDescriptor,
        _config: &PotashConfig,
    ) -> PotashResult<()> {
        let map_name = index_descriptor.index_map_name();
        let id = Value::PotashId(field_values.id());

        for word in Self::words(field_values, index_descriptor)? {
            let key = Value::String(word);
            let mut ids = Self::id_list(&map_name, staged.get(&map_name, &key))?;
            if let Ok(position) = ids.binary_search(&id) {
                ids.remove(position);
                if ids.is_empty() {
                    staged.remove(&map_name, key);
                } else {
                    staged.put(&map_name, key, Value::Array(ids));
                }
            }
        }
        Ok(())
    }

    fn find_by_filter(
        &self,
        snapshot: &StoreSnapshot,
        index_descriptor: &IndexDescriptor,
        filter: &Filter,
        _config: &PotashConfig,
    ) -> PotashResult<Option<Vec<PotashId>>> {
        let text = match as_text_filter(filter) {
            Some(text) if filter.field_name() == Some(index_descriptor.index_fields().first_field()) => text,
            _ => return Ok(None),
        };

        let query = text.text_query()?;
        let map_name = index_descriptor.index_map_name();
        match snapshot.table(&map_name) {
            Some(table) => Self::search(&map_name, table, query).map(Some),
            None => Ok(Some(Vec::new())),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::filter::field;
    use crate::val;

    fn descriptor() -> IndexDescriptor {
        IndexDescriptor::new(FULL_TEXT_INDEX, Fields::with_names(vec!["body"]).unwrap(), "notes")
    }

    fn write(staged: &mut StagedWrite, value: Value) -> PotashId {
        let descriptor = descriptor();
        let id = PotashId::new();
        let entry = FieldValues::new(id, descriptor.index_fields().clone(), vec![value]);
        FullTextIndexer::new()
            .write_index_entry(staged, &entry, &descriptor, &PotashConfig::new())
            .unwrap();
        id
    }

    fn find(snapshot: &StoreSnapshot, filter: Filter) -> Option<Vec<PotashId>> {
        FullTextIndexer::new()
            .find_by_filter(snapshot, &descriptor(), &filter, &PotashConfig::new())
            .unwrap()
    }

    #[test]
    fn test_validate_index() {
        let indexer = FullTextIndexer::new();
        assert!(indexer.validate_index(&Fields::with_names(vec!["body"]).unwrap()).is_ok());
        let err = indexer
            .validate_index(&Fields::with_names(vec!["title", "body"]).unwrap())
            .unwrap_err();
        assert_eq!(err.kind(), &ErrorKind::IndexValidationError);
        assert_eq!(indexer.index_type(), FULL_TEXT_INDEX);
        assert!(!indexer.is_unique());
    }

    #[test]
    fn test_words_map_to_ids() {
        let mut staged = StagedWrite::new(StoreSnapshot::new());
        let fox = write(&mut staged, val!("The quick brown fox"));
        let dog = write(&mut staged, val!("The lazy brown dog"));
        let map_name = descriptor().index_map_name();

        assert!(staged.get(&map_name, &val!("the")).is_none());
        assert_eq!(
            staged.get(&map_name, &val!("brown")),
            Some(&Value::Array(vec![Value::PotashId(fox), Value::PotashId(dog)]))
        );

        let snapshot = staged.view().clone();
        assert_eq!(find(&snapshot, field("body").text("fox")), Some(vec![fox]));
        assert_eq!(find(&snapshot, field("body").text("LAZY cat")), Some(vec![dog]));
        assert_eq!(find(&snapshot, field("body").text("brown dog")), Some(vec![dog, fox]));
        assert_eq!(find(&snapshot, field("body").text("qu*")), Some(vec![fox]));
        assert_eq!(find(&snapshot, field("body").text("*og")), Some(vec![dog]));
        assert_eq!(find(&snapshot, field("body").text("*ow*")), Some(vec![fox, dog]));
        assert_eq!(find(&snapshot, field("body").text("the")), Some(Vec::new()));
    }

    #[test]
    fn test_other_filters_are_not_answered() {
        let snapshot = StoreSnapshot::new();
        assert_eq!(find(&snapshot, field("body").eq("fox")), None);
        assert_eq!(find(&snapshot, field("title").text("fox")), None);
        assert_eq!(find(&snapshot, field("body").text("fox")), Some(Vec::new()));
    }

    #[test]
    fn test_remove_and_drop() {
        let descriptor = descriptor();
        let config = PotashConfig::new();
        let indexer = FullTextIndexer::new();
        let mut staged = StagedWrite::new(StoreSnapshot::new());
        let first = write(&mut staged, val!("red apple"));
        let second = write(&mut staged, val!("green apple"));

        let entry = FieldValues::new(first, descriptor.index_fields().clone(), vec![val!("red apple")]);
        indexer.remove_index_entry(&mut staged, &entry, &descriptor, &config).unwrap();
        let map_name = descriptor.index_map_name();
        assert!(staged.get(&map_name, &val!("red")).is_none());
        assert_eq!(find(staged.view(), field("body").text("apple")), Some(vec![second]));

        indexer.drop_index(&mut staged, &descriptor, &config).unwrap();
        assert!(!staged.has_map(&map_name));
    }

    #[test]
    fn test_arrays_nulls_and_non_text() {
        let descriptor = descriptor();
        let config = PotashConfig::new();
        let indexer = FullTextIndexer::new();
        let mut staged = StagedWrite::new(StoreSnapshot::new());

        write(&mut staged, Value::Null);
        assert!(staged.is_empty());

        let tagged = write(&mut staged, Value::Array(vec![val!("rust"), Value::Null, val!("embedded db")]));
        assert_eq!(find(staged.view(), field("body").text("db")), Some(vec![tagged]));

        let number = FieldValues::new(PotashId::new(), descriptor.index_fields().clone(), vec![val!(42)]);
        let err = indexer
            .write_index_entry(&mut staged, &number, &descriptor, &config)
            .unwrap_err();
        assert_eq!(err.kind(), &ErrorKind::IndexValidationError);
    }
}
