use matfile_reader::{MatFileReader, MatValue, MatrixContent, Payload};
use std::env;

/// Longest row/entry listing printed per value.
const PREVIEW_LIMIT: usize = 6;

fn main() {
    let args: Vec<String> = env::args().collect();

    if args.len() < 2 {
        eprintln!("Usage: {} <path-to-mat-file> [--raw]", args[0]);
        std::process::exit(1);
    }

    let mat_path = &args[1];
    let raw = args.iter().skip(2).any(|arg| arg == "--raw");

    println!("Reading MAT-file: {}", mat_path);
    println!("{}", "=".repeat(60));

    let mut reader = match MatFileReader::open(mat_path) {
        Ok(reader) => reader,
        Err(e) => fail(e),
    };

    println!("\nFile Information:");
    println!("  Description: {}", reader.header.description);
    println!("  Version: {:#06x}", reader.header.version);
    println!("  Byte order: {}", reader.header.endian);
    if let Some(offset) = &reader.header.data_offset {
        println!("  Subsystem data offset: {}", offset);
    }

    println!("\nVariables:");
    for (i, element) in reader.elements().enumerate() {
        let element = match element {
            Ok(element) => element,
            Err(e) => fail(e),
        };

        let Payload::Matrix(matrix) = &element.payload else {
            println!("  {}. <{} element> {}", i + 1, element.payload.kind(), element.tag);
            continue;
        };

        println!(
            "  {}. {} [{}] dims={:?}{}{}{}",
            i + 1,
            if matrix.name.is_empty() { "<unnamed>" } else { matrix.name.as_str() },
            matrix.class.name(),
            matrix.dimensions,
            if matrix.flags.complex { " complex" } else { "" },
            if matrix.flags.logical { " logical" } else { "" },
            if matrix.flags.global { " global" } else { "" },
        );

        if raw {
            print_raw(&matrix.content, 2);
            continue;
        }

        match matrix.to_value() {
            Ok(value) => print_value(&value, 2),
            Err(e) => println!("      (not reconstructed: {})", e),
        }
    }
}

fn fail(e: matfile_reader::MatError) -> ! {
    eprintln!("\nERROR: Failed to read MAT-file");
    eprintln!("  {}", e);
    std::process::exit(1);
}

fn print_raw(content: &MatrixContent, depth: usize) {
    let indent = "    ".repeat(depth);
    match content {
        MatrixContent::Dense { real, imaginary } => {
            println!("{}real: {} x {}", indent, real.type_name(), real.len());
            if let Some(imaginary) = imaginary {
                println!("{}imaginary: {} x {}", indent, imaginary.type_name(), imaginary.len());
            }
        }
        MatrixContent::Sparse {
            row_index,
            column_index,
            real,
            imaginary,
        } => {
            println!("{}row index: {:?}", indent, truncate(row_index));
            println!("{}column index: {:?}", indent, truncate(column_index));
            println!("{}real: {} x {}", indent, real.type_name(), real.len());
            if let Some(imaginary) = imaginary {
                println!("{}imaginary: {} x {}", indent, imaginary.type_name(), imaginary.len());
            }
        }
        MatrixContent::Cell(cells) => {
            for cell in cells {
                println!("{}{}", indent, cell.tag);
                if let Some(matrix) = cell.payload.as_matrix() {
                    print_raw(&matrix.content, depth + 1);
                }
            }
        }
    }
}

fn print_value(value: &MatValue, depth: usize) {
    let indent = "    ".repeat(depth);
    match value {
        MatValue::Empty => println!("{}[]", indent),
        MatValue::Dense(m) => {
            for row in m.to_rows().iter().take(PREVIEW_LIMIT) {
                println!("{}{:?}", indent, truncate(row));
            }
        }
        MatValue::ComplexDense(m) => {
            for row in m.to_rows().iter().take(PREVIEW_LIMIT) {
                let row: Vec<String> = row.iter().map(|c| c.to_string()).collect();
                println!("{}{:?}", indent, truncate(&row));
            }
        }
        MatValue::Sparse(m) => {
            println!("{}{}x{} sparse, {} stored", indent, m.rows(), m.cols(), m.nnz());
            for (r, c, v) in m.iter().take(PREVIEW_LIMIT) {
                println!("{}({}, {}) = {}", indent, r, c, v);
            }
        }
        MatValue::ComplexSparse(m) => {
            println!("{}{}x{} complex sparse, {} stored", indent, m.rows(), m.cols(), m.nnz());
            for (r, c, v) in m.iter().take(PREVIEW_LIMIT) {
                println!("{}({}, {}) = {}", indent, r, c, v);
            }
        }
        MatValue::List(items) => {
            for (i, item) in items.iter().enumerate() {
                println!("{}{{{}}} {}", indent, i + 1, item.kind());
                print_value(item, depth + 1);
            }
        }
    }
}

fn truncate<T>(items: &[T]) -> &[T] {
    &items[..items.len().min(PREVIEW_LIMIT)]
}
