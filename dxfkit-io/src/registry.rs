use std::collections::HashMap;

use crate::error::Result;
use crate::reader::GroupReader;
use crate::spec::SpecRecord;

/// 单条记录的解析结果。`consumed` 为假表示记录体为空。
#[derive(Debug, Clone, PartialEq)]
pub struct Parsed<T> {
    pub record: T,
    pub consumed: bool,
}

pub type ParseFn<T> = fn(&mut GroupReader<'_>) -> Result<Parsed<T>>;

/// 记录类型名（组码 0 的值）到解析函数的注册表。
pub struct RecordRegistry<T> {
    parsers: HashMap<&'static str, ParseFn<T>>,
}

impl<T> Default for RecordRegistry<T> {
    fn default() -> Self {
        Self {
            parsers: HashMap::new(),
        }
    }
}

impl<T: 'static> RecordRegistry<T> {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn register(&mut self, name: &'static str, parser: ParseFn<T>) {
        self.parsers.insert(name, parser);
    }

    /// 以字段表的名字注册一种记录。
    pub fn register_record<R>(&mut self)
    where
        R: SpecRecord + Into<T>,
    {
        self.register(R::spec().name(), parse_as::<R, T>);
    }

    pub fn contains(&self, name: &str) -> bool {
        self.parsers.contains_key(name)
    }

    /// 解析名为 `name` 的记录；未注册时返回 `None`。
    pub fn parse(&self, name: &str, reader: &mut GroupReader<'_>) -> Option<Result<Parsed<T>>> {
        self.parsers.get(name).map(|parser| parser(reader))
    }

    pub fn names(&self) -> impl Iterator<Item = &'static str> + '_ {
        self.parsers.keys().copied()
    }
}

fn parse_as<R, T>(reader: &mut GroupReader<'_>) -> Result<Parsed<T>>
where
    R: SpecRecord + Into<T>,
{
    let (record, consumed) = R::parse_from(reader)?;
    Ok(Parsed {
        record: record.into(),
        consumed,
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::spec::{store, RecordSpec};
    use once_cell::sync::Lazy;

    #[derive(Debug, Default, PartialEq)]
    struct Named {
        name: String,
    }

    static NAMED: Lazy<RecordSpec<Named>> =
        Lazy::new(|| RecordSpec::<Named>::builder("NAMED").field(2, store!(name = text)).build());

    impl SpecRecord for Named {
        fn spec() -> &'static RecordSpec<Self> {
            &NAMED
        }
    }

    impl From<Named> for String {
        fn from(value: Named) -> Self {
            value.name
        }
    }

    #[test]
    fn dispatches_by_record_name() {
        let mut registry = RecordRegistry::<String>::new();
        registry.register_record::<Named>();
        assert!(registry.contains("NAMED"));
        assert_eq!(registry.names().collect::<Vec<_>>(), vec!["NAMED"]);

        let mut reader = GroupReader::new("2\nhello\n0\nEOF\n");
        let parsed = registry
            .parse("NAMED", &mut reader)
            .expect("应已注册")
            .expect("解析失败");
        assert_eq!(parsed.record, "hello");
        assert!(parsed.consumed);
        assert!(registry.parse("OTHER", &mut reader).is_none());
    }
}
