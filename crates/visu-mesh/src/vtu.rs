//! ASCII VTK UnstructuredGrid (`.vtu`) export.
//!
//! Only point data is written. Arrays whose tuple count does not match the
//! point count are skipped with a warning, since VTK would reject the file.

use std::fs::File;
use std::io::{self, BufWriter, Write};
use std::path::Path;

use crate::block::MeshBlock;

/// Write `block` to `path`, replacing any existing file.
pub fn export_vtu(block: &MeshBlock, path: impl AsRef<Path>) -> io::Result<()> {
    let mut w = BufWriter::new(File::create(path.as_ref())?);
    write_vtu(block, &mut w)?;
    w.flush()
}

/// Write `block` as a VTU document.
pub fn write_vtu<W: Write>(block: &MeshBlock, w: &mut W) -> io::Result<()> {
    writeln!(w, r#"<?xml version="1.0"?>"#)?;
    writeln!(
        w,
        r#"<VTKFile type="UnstructuredGrid" version="0.1" byte_order="LittleEndian">"#
    )?;
    writeln!(w, "  <UnstructuredGrid>")?;
    writeln!(
        w,
        r#"    <Piece NumberOfPoints="{}" NumberOfCells="{}">"#,
        block.n_points(),
        block.n_cells()
    )?;

    writeln!(w, "      <PointData>")?;
    for field in block.fields() {
        if field.tuple_count() != block.n_points() {
            log::warn!(
                "skipping array '{}': {} tuples for {} points",
                field.name(),
                field.tuple_count(),
                block.n_points()
            );
            continue;
        }
        writeln!(
            w,
            r#"        <DataArray type="Float64" Name="{}" NumberOfComponents="{}" format="ascii">"#,
            escape(field.name()),
            field.components()
        )?;
        for tuple in field.tuples() {
            write!(w, "         ")?;
            for v in tuple {
                write!(w, " {v}")?;
            }
            writeln!(w)?;
        }
        writeln!(w, "        </DataArray>")?;
    }
    writeln!(w, "      </PointData>")?;

    writeln!(w, "      <Points>")?;
    writeln!(
        w,
        r#"        <DataArray type="Float64" NumberOfComponents="3" format="ascii">"#
    )?;
    for [x, y, z] in block.points() {
        writeln!(w, "          {x} {y} {z}")?;
    }
    writeln!(w, "        </DataArray>")?;
    writeln!(w, "      </Points>")?;

    let arity = block.kind().arity();
    writeln!(w, "      <Cells>")?;
    writeln!(
        w,
        r#"        <DataArray type="Int64" Name="connectivity" format="ascii">"#
    )?;
    for cell in block.cells() {
        write!(w, "         ")?;
        for id in cell {
            write!(w, " {id}")?;
        }
        writeln!(w)?;
    }
    writeln!(w, "        </DataArray>")?;
    writeln!(
        w,
        r#"        <DataArray type="Int64" Name="offsets" format="ascii">"#
    )?;
    for i in 1..=block.n_cells() {
        writeln!(w, "          {}", i * arity)?;
    }
    writeln!(w, "        </DataArray>")?;
    writeln!(
        w,
        r#"        <DataArray type="UInt8" Name="types" format="ascii">"#
    )?;
    let ty = block.kind().vtk_type();
    for _ in 0..block.n_cells() {
        writeln!(w, "          {ty}")?;
    }
    writeln!(w, "        </DataArray>")?;
    writeln!(w, "      </Cells>")?;

    writeln!(w, "    </Piece>")?;
    writeln!(w, "  </UnstructuredGrid>")?;
    writeln!(w, "</VTKFile>")
}

fn escape(name: &str) -> String {
    let mut out = String::with_capacity(name.len());
    for ch in name.chars() {
        match ch {
            '&' => out.push_str("&amp;"),
            '<' => out.push_str("&lt;"),
            '>' => out.push_str("&gt;"),
            '"' => out.push_str("&quot;"),
            '\'' => out.push_str("&apos;"),
            c => out.push(c),
        }
    }
    out
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::block::{CellKind, FieldArray};

    fn unit_quad() -> MeshBlock {
        let mut block = MeshBlock::from_parts(
            CellKind::Quad,
            vec![
                [0.0, 0.0, 0.0],
                [1.0, 0.0, 0.0],
                [1.0, 1.0, 0.0],
                [0.0, 1.0, 0.0],
            ],
            vec![0, 1, 2, 3],
        );
        block.insert_field(FieldArray::new("Density", 1, vec![1.0, 1.5, 2.0, 2.5]).unwrap());
        block
    }

    fn render(block: &MeshBlock) -> String {
        let mut buf = Vec::new();
        write_vtu(block, &mut buf).unwrap();
        String::from_utf8(buf).unwrap()
    }

    #[test]
    fn writes_piece_header_and_cell_type() {
        let text = render(&unit_quad());
        assert!(text.contains(r#"<Piece NumberOfPoints="4" NumberOfCells="1">"#));
        assert!(text.contains(r#"Name="Density" NumberOfComponents="1""#));
        assert!(text.contains("          0 1 2 3\n"));
        assert!(text.contains("          4\n"));
        assert!(text.contains("          9\n"));
        assert!(text.trim_end().ends_with("</VTKFile>"));
    }

    #[test]
    fn mismatched_arrays_are_skipped() {
        let mut block = unit_quad();
        block.insert_field(FieldArray::new("Velocity", 3, vec![0.0; 3]).unwrap());
        let text = render(&block);
        assert!(!text.contains("Velocity"));
        assert!(text.contains("Density"));
    }

    #[test]
    fn names_are_escaped() {
        assert_eq!(escape("ElemData:FV_Elems"), "ElemData:FV_Elems");
        assert_eq!(escape("a<b&\"c\""), "a&lt;b&amp;&quot;c&quot;");
    }
}
