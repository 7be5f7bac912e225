use idsview_format::{
    data_type::DataType,
    path::NodePath,
    schema::{StructType, StructTypeRef},
};

use crate::record::Record;

pub fn element_type() -> StructTypeRef {
    StructType::builder("element")
        .leaf("a", DataType::Flt, 0)
        .build()
}

pub fn ion_type() -> StructTypeRef {
    StructType::builder("ion")
        .leaf("label", DataType::Str, 0)
        .struct_array("element", element_type())
        .build()
}

pub fn profile_type() -> StructTypeRef {
    StructType::builder("profiles_1d")
        .leaf("time", DataType::Flt, 0)
        .struct_array("ion", ion_type())
        .build()
}

/// One profile per entry of `ion_counts`, with that many ions labelled
/// `ion_{profile}_{ion}`, each holding one element.
pub fn profiles(ion_counts: &[usize]) -> Vec<Record> {
    let root = NodePath::new("profiles_1d");
    ion_counts
        .iter()
        .enumerate()
        .map(|(p, &count)| {
            let path = root.element(p);
            let ions = (0..count)
                .map(|i| {
                    let ion_path = path.child("ion").element(i);
                    let element = Record::builder(element_type(), ion_path.child("element").element(0))
                        .set("a", 1.0 + i as f64)
                        .unwrap()
                        .build();
                    Record::builder(ion_type(), ion_path)
                        .set("label", format!("ion_{p}_{i}"))
                        .unwrap()
                        .set_records("element", vec![element])
                        .unwrap()
                        .build()
                })
                .collect();
            Record::builder(profile_type(), path)
                .set("time", p as f64)
                .unwrap()
                .set_records("ion", ions)
                .unwrap()
                .build()
        })
        .collect()
}
