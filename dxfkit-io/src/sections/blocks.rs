use std::collections::BTreeMap;

use dxfkit_core::Block;

use super::entities::parse_entity_list;
use crate::error::Result;
use crate::reader::GroupReader;
use crate::spec::{spec_record, store, RecordSpec, SpecRecord};

spec_record!(Block => || {
    RecordSpec::<Block>::builder("BLOCK")
        .field(5, store!(handle = Some(text)))
        .multiple(102, |_, cx| cx.skip_application_group())
        .field(330, store!(owner_handle = Some(text)))
        .ignore_multiple(100)
        .field(8, store!(layer = Some(text)))
        .field(2, store!(name = text))
        .field(70, |r, cx| {
            let flag = cx.int()?;
            if flag != 0 {
                r.block_type = Some(flag);
            }
            Ok(())
        })
        .field(10, store!(position = Some(point)))
        .field(3, store!(name2 = Some(text)))
        .field(1, store!(xref_path = Some(text)))
        .field(4, store!(description = Some(text)))
        .field(67, |r, cx| {
            r.paper_space = cx.int()? == 1;
            Ok(())
        })
        .multiple(1001, |r, cx| {
            let xdata = cx.xdata()?;
            r.xdata.extend(xdata);
            Ok(())
        })
        .build()
});

/// 解析 BLOCKS 段。名称为空的块被丢弃，同名块以后出现者为准。
pub fn parse_blocks(reader: &mut GroupReader<'_>) -> Result<BTreeMap<String, Block>> {
    let mut blocks = BTreeMap::new();
    loop {
        let token = reader.next()?;
        if token.is_eof() {
            reader.rewind(1);
            break;
        }
        if token.is(0, "ENDSEC") {
            break;
        }
        if token.is(0, "BLOCK") {
            let block = parse_block(reader)?;
            if !block.name.is_empty() {
                blocks.insert(block.name.clone(), block);
            }
        }
    }
    Ok(blocks)
}

/// 从 `(0, "BLOCK")` 之后开始，读取块头、块内实体和 ENDBLK 记录。
///
/// ENDBLK 自身的字段（包括 AcDbBlockEnd 标记）一并跳过，
/// 因此没有该标记的 R12 文件同样能正确结束。
pub fn parse_block(reader: &mut GroupReader<'_>) -> Result<Block> {
    let (mut block, _) = Block::parse_from(reader)?;
    block.entities = parse_entity_list(reader)?;

    let token = reader.next()?;
    if token.is(0, "ENDBLK") {
        reader.skip_to_next_record()?;
    } else {
        reader.rewind(1);
    }
    Ok(block)
}

#[cfg(test)]
mod tests {
    use super::*;
    use dxfkit_core::Point3D;

    const BLOCKS: &str = concat!(
        "0\nBLOCK\n5\n20\n330\n1F\n100\nAcDbEntity\n8\n0\n100\nAcDbBlockBegin\n2\nDOOR\n70\n0\n",
        "10\n1\n20\n2\n30\n0\n3\nDOOR\n1\n\n",
        "0\nLINE\n5\n21\n8\n0\n100\nAcDbLine\n10\n0\n20\n0\n30\n0\n11\n1\n21\n0\n31\n0\n",
        "0\nENDBLK\n5\n22\n330\n1F\n100\nAcDbEntity\n8\n0\n100\nAcDbBlockEnd\n",
        "0\nBLOCK\n2\n*Paper_Space\n70\n1\n67\n1\n10\n0\n20\n0\n",
        "0\nENDBLK\n5\n24\n",
        "0\nBLOCK\n8\n0\n",
        "0\nENDBLK\n",
        "0\nENDSEC\n0\nEOF\n",
    );

    #[test]
    fn reads_headers_entities_and_endblk() {
        let mut reader = GroupReader::new(BLOCKS);
        let blocks = parse_blocks(&mut reader).expect("解析 BLOCKS 失败");
        assert_eq!(blocks.len(), 2, "名称为空的块应被丢弃");

        let door = &blocks["DOOR"];
        assert_eq!(door.handle.as_deref(), Some("20"));
        assert_eq!(door.owner_handle.as_deref(), Some("1F"));
        assert_eq!(door.position, Some(Point3D::new(1.0, 2.0, 0.0)));
        assert_eq!(door.name2.as_deref(), Some("DOOR"));
        assert_eq!(door.xref_path.as_deref(), Some(""));
        assert_eq!(door.block_type, None);
        assert_eq!(door.entities.len(), 1);
        assert!(!door.paper_space);

        let paper = &blocks["*Paper_Space"];
        assert!(paper.paper_space);
        assert_eq!(paper.block_type, Some(1));
        assert!(paper.entities.is_empty());
        assert!(reader.next().expect("应能读到下一组").is_eof());
    }

    #[test]
    fn r12_endblk_without_marker_terminates() {
        let mut reader = GroupReader::new(concat!(
            "0\nBLOCK\n8\n0\n2\nR12\n70\n0\n10\n0\n20\n0\n30\n0\n",
            "0\nCIRCLE\n8\n0\n10\n0\n20\n0\n30\n0\n40\n1\n",
            "0\nENDBLK\n8\n0\n",
            "0\nENDSEC\n",
        ));
        let blocks = parse_blocks(&mut reader).expect("解析 BLOCKS 失败");
        assert_eq!(blocks["R12"].entities.len(), 1);
        assert!(reader.diagnostics().is_empty());
    }
}
