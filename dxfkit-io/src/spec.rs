//! 声明式字段表：按组码把 token 分派到记录字段。
//!
//! 同一组码可以注册多个字段，按注册顺序依次消费，每个非重复字段只消费一次；
//! 重复字段（`multiple`）会一直匹配，之后注册的同码字段因此被遮蔽。
//! `boundary` 字段在被消费后开启下一个作用域，查找时先搜索最新开启的作用域。

use std::collections::HashMap;
use std::ops::RangeInclusive;

use dxfkit_core::{GroupValue, Point3D, XData};
use tracing::{debug, warn};

use crate::error::{DxfError, Result};
use crate::point::read_point;
use crate::reader::{GroupReader, Token};
use crate::xdata::read_xdata;

pub type FieldFn<R> = fn(&mut R, &mut FieldContext<'_, '_>) -> Result<()>;
pub type StepFn<R> = fn(&mut R, &mut FieldContext<'_, '_>) -> Result<FieldStep>;

/// 字段处理器对解析流程的反馈。
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum FieldStep {
    Consumed,
    /// 该 token 不属于当前记录：回退一组并结束。
    NotForThisScope,
    /// 记录已完整结束（例如读完 SEQEND），不回退。
    EndOfRecord,
}

enum Action<R> {
    Store(FieldFn<R>),
    Step(StepFn<R>),
    Ignore,
}

struct FieldSpec<R> {
    codes: Vec<i32>,
    action: Action<R>,
    multiple: bool,
    boundary: bool,
    scope: usize,
}

/// 一种记录（实体、表项、对象……）的完整字段表。
pub struct RecordSpec<R> {
    name: &'static str,
    specs: Vec<FieldSpec<R>>,
    /// 每个作用域内，组码到槽位队列的映射。
    scopes: Vec<HashMap<i32, Vec<usize>>>,
    /// 槽位到字段下标。一个字段注册多个组码时占用多个槽位。
    slots: Vec<usize>,
}

impl<R> RecordSpec<R> {
    pub fn builder(name: &'static str) -> SpecBuilder<R> {
        SpecBuilder {
            name,
            specs: Vec::new(),
            scope: 0,
        }
    }

    pub fn name(&self) -> &'static str {
        self.name
    }

    /// 从读取器的下一组开始填充 `record`，返回是否至少消费了一组。
    ///
    /// 遇到 `(0, "EOF")`、没有字段匹配的组，或处理器返回
    /// [`FieldStep::NotForThisScope`] 时回退该组并停止。
    pub fn parse_into(&self, reader: &mut GroupReader<'_>, record: &mut R) -> Result<bool> {
        let mut used = vec![false; self.slots.len()];
        let mut active = 0usize;
        let mut consumed = false;

        let mut token = reader.next()?;
        loop {
            if token.is_eof() {
                reader.rewind(1);
                break;
            }
            let Some(slot) = self.lookup(token.code, active, &used) else {
                reader.rewind(1);
                break;
            };
            let spec = &self.specs[self.slots[slot]];
            if !spec.multiple {
                used[slot] = true;
            }

            let line = reader.line();
            let step = {
                let mut cx = FieldContext {
                    reader: &mut *reader,
                    token,
                    line,
                };
                match &spec.action {
                    Action::Store(handler) => {
                        handler(record, &mut cx)?;
                        FieldStep::Consumed
                    }
                    Action::Step(handler) => handler(record, &mut cx)?,
                    Action::Ignore => FieldStep::Consumed,
                }
            };

            match step {
                FieldStep::Consumed => {}
                FieldStep::NotForThisScope => {
                    reader.rewind(1);
                    break;
                }
                FieldStep::EndOfRecord => {
                    consumed = true;
                    break;
                }
            }
            consumed = true;
            if spec.boundary && active + 1 < self.scopes.len() {
                active += 1;
            }
            token = reader.next()?;
        }
        Ok(consumed)
    }

    fn lookup(&self, code: i32, active: usize, used: &[bool]) -> Option<usize> {
        self.scopes[..=active]
            .iter()
            .rev()
            .filter_map(|scope| scope.get(&code))
            .find_map(|queue| queue.iter().copied().find(|&slot| !used[slot]))
    }
}

pub struct SpecBuilder<R> {
    name: &'static str,
    specs: Vec<FieldSpec<R>>,
    scope: usize,
}

impl<R> SpecBuilder<R> {
    pub fn field(self, codes: impl IntoCodes, handler: FieldFn<R>) -> Self {
        self.push(codes, Action::Store(handler), false, false)
    }

    pub fn multiple(self, codes: impl IntoCodes, handler: FieldFn<R>) -> Self {
        self.push(codes, Action::Store(handler), true, false)
    }

    pub fn step(self, codes: impl IntoCodes, handler: StepFn<R>) -> Self {
        self.push(codes, Action::Step(handler), false, false)
    }

    pub fn multiple_step(self, codes: impl IntoCodes, handler: StepFn<R>) -> Self {
        self.push(codes, Action::Step(handler), true, false)
    }

    /// 消费一次但不记录。
    pub fn ignore(self, codes: impl IntoCodes) -> Self {
        self.push(codes, Action::Ignore, false, false)
    }

    pub fn ignore_multiple(self, codes: impl IntoCodes) -> Self {
        self.push(codes, Action::Ignore, true, false)
    }

    /// 注册在当前作用域内、消费后开启下一作用域的字段。
    pub fn boundary(mut self, codes: impl IntoCodes, handler: FieldFn<R>) -> Self {
        self = self.push(codes, Action::Store(handler), false, true);
        self.scope += 1;
        self
    }

    /// 复用一组公共字段。
    pub fn with(self, fields: fn(Self) -> Self) -> Self {
        fields(self)
    }

    pub fn build(self) -> RecordSpec<R> {
        let scope_count = self.specs.iter().map(|spec| spec.scope + 1).max().unwrap_or(1);
        let mut scopes: Vec<HashMap<i32, Vec<usize>>> = vec![HashMap::new(); scope_count];
        let mut slots: Vec<usize> = Vec::new();

        for (index, spec) in self.specs.iter().enumerate() {
            for &code in &spec.codes {
                let queue = scopes[spec.scope].entry(code).or_default();
                if let Some(&last) = queue.last() {
                    let previous = &self.specs[slots[last]];
                    if previous.multiple {
                        warn!(record = self.name, code, "组码 {code} 的字段被前面的重复字段遮蔽");
                    } else if !spec.multiple {
                        debug!(record = self.name, code, "组码 {code} 注册了多个字段，按顺序消费");
                    }
                }
                queue.push(slots.len());
                slots.push(index);
            }
        }

        RecordSpec {
            name: self.name,
            specs: self.specs,
            scopes,
            slots,
        }
    }

    fn push(mut self, codes: impl IntoCodes, action: Action<R>, multiple: bool, boundary: bool) -> Self {
        self.specs.push(FieldSpec {
            codes: codes.into_codes(),
            action,
            multiple,
            boundary,
            scope: self.scope,
        });
        self
    }
}

pub trait IntoCodes {
    fn into_codes(self) -> Vec<i32>;
}

impl IntoCodes for i32 {
    fn into_codes(self) -> Vec<i32> {
        vec![self]
    }
}

impl<const N: usize> IntoCodes for [i32; N] {
    fn into_codes(self) -> Vec<i32> {
        self.to_vec()
    }
}

impl IntoCodes for Vec<i32> {
    fn into_codes(self) -> Vec<i32> {
        self
    }
}

impl IntoCodes for RangeInclusive<i32> {
    fn into_codes(self) -> Vec<i32> {
        self.collect()
    }
}

/// 由字段表驱动解析的记录类型。
pub trait SpecRecord: Default + Sized + 'static {
    fn spec() -> &'static RecordSpec<Self>;

    fn parse_from(reader: &mut GroupReader<'_>) -> Result<(Self, bool)> {
        let mut record = Self::default();
        let consumed = Self::spec().parse_into(reader, &mut record)?;
        Ok((record, consumed))
    }
}

/// 字段处理器看到的当前 token 及读取器。
pub struct FieldContext<'r, 'a> {
    reader: &'r mut GroupReader<'a>,
    token: Token,
    line: usize,
}

impl<'r, 'a> FieldContext<'r, 'a> {
    pub fn code(&self) -> i32 {
        self.token.code
    }

    pub fn value(&self) -> &GroupValue {
        &self.token.value
    }

    pub fn token(&self) -> &Token {
        &self.token
    }

    pub fn line(&self) -> usize {
        self.line
    }

    pub fn reader(&mut self) -> &mut GroupReader<'a> {
        self.reader
    }

    pub fn is(&self, code: i32, value: &str) -> bool {
        self.token.is(code, value)
    }

    /// 任意值都可按文本读取。
    pub fn text(&self) -> Result<String> {
        Ok(self.token.value.to_string())
    }

    pub fn float(&self) -> Result<f64> {
        self.token.value.as_f64().ok_or_else(|| self.mismatch("float"))
    }

    pub fn int(&self) -> Result<i64> {
        self.token.value.as_i64().ok_or_else(|| self.mismatch("integer"))
    }

    pub fn flag(&self) -> Result<bool> {
        self.token.value.as_bool().ok_or_else(|| self.mismatch("boolean"))
    }

    pub fn point(&mut self) -> Result<Point3D> {
        read_point(self.reader, &self.token)
    }

    /// 读取点并补全缺省的 Z 坐标。
    pub fn point_3d(&mut self) -> Result<Point3D> {
        Ok(self.point()?.normalized())
    }

    pub fn xdata(&mut self) -> Result<Vec<XData>> {
        read_xdata(self.reader, &self.token)
    }

    /// 跳过 `{ACAD_XDICTIONARY ... }` 这类 102 应用组，直到闭合的 102 组。
    pub fn skip_application_group(&mut self) -> Result<()> {
        loop {
            let token = self.reader.next()?;
            if token.code == 102 || token.is_eof() {
                if token.is_eof() {
                    self.reader.rewind(1);
                }
                return Ok(());
            }
        }
    }

    /// 从当前 token 开始解析一个嵌套记录。
    pub fn parse_nested<T: SpecRecord>(&mut self) -> Result<T> {
        self.reader.rewind(1);
        Ok(T::parse_from(self.reader)?.0)
    }

    /// 当前 token 是嵌套记录的起始标记，从下一组开始解析该记录。
    pub fn continue_with<T: SpecRecord>(&mut self) -> Result<T> {
        Ok(T::parse_from(self.reader)?.0)
    }

    fn mismatch(&self, expected: &'static str) -> DxfError {
        DxfError::UnexpectedValue {
            line: self.line,
            code: self.token.code,
            expected,
            found: self.token.value.kind(),
        }
    }
}

/// 生成把读取结果写入字段的处理器：`store!(a.b = float)`、`store!(c = Some(text))`。
macro_rules! store {
    ($($field:ident).+ = Some($read:ident)) => {
        |record, cx| {
            record.$($field).+ = Some(cx.$read()?);
            Ok(())
        }
    };
    ($($field:ident).+ = $read:ident) => {
        |record, cx| {
            record.$($field).+ = cx.$read()?;
            Ok(())
        }
    };
}

/// 生成把读取结果追加到列表字段的处理器：`append!(knots = float)`。
macro_rules! append {
    ($($field:ident).+ = $read:ident) => {
        |record, cx| {
            record.$($field).+.push(cx.$read()?);
            Ok(())
        }
    };
}

/// 为记录类型实现 [`SpecRecord`]，字段表在首次使用时构建。
macro_rules! spec_record {
    ($ty:ty => $build:expr) => {
        impl $crate::spec::SpecRecord for $ty {
            fn spec() -> &'static $crate::spec::RecordSpec<Self> {
                static SPEC: ::once_cell::sync::Lazy<$crate::spec::RecordSpec<$ty>> =
                    ::once_cell::sync::Lazy::new($build);
                &SPEC
            }
        }
    };
}

pub(crate) use append;
pub(crate) use spec_record;
pub(crate) use store;

#[cfg(test)]
mod tests {
    use super::*;
    use once_cell::sync::Lazy;

    #[derive(Debug, Default)]
    struct Probe {
        name: String,
        values: Vec<f64>,
        first: Option<i64>,
        second: Option<i64>,
        inner: Vec<i64>,
        marker: Vec<String>,
    }

    static PROBE: Lazy<RecordSpec<Probe>> = Lazy::new(|| {
        RecordSpec::<Probe>::builder("PROBE")
            .field(2, store!(name = text))
            .field(70, store!(first = Some(int)))
            .field(70, store!(second = Some(int)))
            .multiple(40, append!(values = float))
            .boundary(100, append!(marker = text))
            .multiple(90, append!(inner = int))
            .field(100, append!(marker = text))
            .build()
    });

    impl SpecRecord for Probe {
        fn spec() -> &'static RecordSpec<Self> {
            &PROBE
        }
    }

    fn parse(text: &str) -> (Probe, bool, GroupReader<'_>) {
        let mut reader = GroupReader::new(text);
        let (probe, consumed) = Probe::parse_from(&mut reader).expect("解析失败");
        (probe, consumed, reader)
    }

    #[test]
    fn same_code_fields_are_consumed_in_order() {
        let (probe, consumed, mut reader) = parse("2\nA\n70\n1\n40\n1.5\n70\n2\n40\n2.5\n70\n3\n");
        assert!(consumed);
        assert_eq!(probe.name, "A");
        assert_eq!(probe.first, Some(1));
        assert_eq!(probe.second, Some(2));
        assert_eq!(probe.values, vec![1.5, 2.5]);
        // 第三个 70 没有字段可用，回退后停止
        assert_eq!(reader.next().expect("应能读到下一组").code, 70);
    }

    #[test]
    fn boundary_opens_next_scope() {
        let (probe, _, mut reader) = parse("90\n1\n100\nAcDbOuter\n90\n2\n100\nAcDbInner\n90\n3\n0\nEOF\n");
        // 边界之前的 90 不属于任何已开启的作用域
        assert!(probe.marker.is_empty());
        assert_eq!(reader.next().expect("应能读到下一组").code, 90);

        let (probe, _, mut reader) = parse("100\nAcDbOuter\n90\n2\n100\nAcDbInner\n90\n3\n0\nEOF\n");
        assert_eq!(probe.marker, vec!["AcDbOuter", "AcDbInner"]);
        assert_eq!(probe.inner, vec![2, 3]);
        assert!(reader.next().expect("应能读到下一组").is_eof());
    }

    #[derive(Debug, Default)]
    struct Layered {
        near: Vec<f64>,
        far: Vec<f64>,
        single: Option<f64>,
        marker: Vec<String>,
    }

    #[test]
    fn earlier_scope_keeps_shared_code_until_boundary() {
        static LAYERED: Lazy<RecordSpec<Layered>> = Lazy::new(|| {
            RecordSpec::<Layered>::builder("LAYERED")
                .multiple(40, append!(near = float))
                .boundary(100, append!(marker = text))
                .multiple(40, append!(far = float))
                .build()
        });

        let mut reader = GroupReader::new("40\n1\n40\n2\n0\nEOF\n");
        let mut record = Layered::default();
        assert!(LAYERED.parse_into(&mut reader, &mut record).expect("解析失败"));
        assert_eq!(record.near, vec![1.0, 2.0]);
        assert!(record.far.is_empty(), "未越过边界时外层字段不可见");
        assert!(record.marker.is_empty());
        assert!(reader.next().expect("应能读到下一组").is_eof());
    }

    #[test]
    fn multiple_field_shadows_later_single_field() {
        static SHADOWED: Lazy<RecordSpec<Layered>> = Lazy::new(|| {
            RecordSpec::<Layered>::builder("SHADOWED")
                .multiple(41, append!(near = float))
                .field(41, store!(single = Some(float)))
                .build()
        });

        let mut reader = GroupReader::new("41\n1\n41\n2\n41\n3\n0\nEOF\n");
        let mut record = Layered::default();
        SHADOWED.parse_into(&mut reader, &mut record).expect("解析失败");
        assert_eq!(record.near, vec![1.0, 2.0, 3.0]);
        assert_eq!(record.single, None);
    }

    #[test]
    fn nothing_consumed_on_foreign_code() {
        let (_, consumed, mut reader) = parse("0\nLINE\n");
        assert!(!consumed);
        assert!(reader.next().expect("应能读到下一组").is(0, "LINE"));
    }

    #[test]
    fn type_mismatch_is_reported() {
        static BAD: Lazy<RecordSpec<Probe>> =
            Lazy::new(|| RecordSpec::<Probe>::builder("BAD").field(2, store!(first = Some(int))).build());
        let mut reader = GroupReader::new("2\nname\n");
        let mut probe = Probe::default();
        let err = BAD.parse_into(&mut reader, &mut probe).unwrap_err();
        assert!(matches!(err, DxfError::UnexpectedValue { code: 2, .. }));
    }
}
