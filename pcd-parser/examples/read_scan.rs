use std::path::PathBuf;

use pcd_parser::{get_reader, Extension};

fn main() {
    let path = PathBuf::from(
        std::env::args()
            .nth(1)
            .unwrap_or_else(|| "examples/data/sample.pcd".to_string()),
    );
    let extension = Extension::from_path(&path).unwrap();
    let scan = get_reader(extension).read_scan(&path).unwrap();

    println!(
        "Number of points: {num_points}, columns: {num_columns}",
        num_points = scan.num_points(),
        num_columns = scan.num_columns()
    );

    println!("First point: {:?}", scan.row(0));
    println!("Bounding volume: {:?}", scan.bounding_volume());
}
