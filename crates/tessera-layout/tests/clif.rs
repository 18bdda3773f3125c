mod common;

use common::*;
use cranelift_codegen::ir::types;
use tessera_hir::{BasicKind, TypeTable};
use tessera_layout::{LayoutError, LoweringContext};

#[test]
fn scalars_map_to_value_types() -> Result<(), LayoutError> {
    let mut table = TypeTable::new();
    let int = table.basic(BasicKind::Int32);
    let boolean = table.basic(BasicKind::Bool);
    let float = table.basic(BasicKind::Float32);
    let cent = table.basic(BasicKind::Uns128);
    let mut cx = LoweringContext::new(&table, linux_x86_64());

    let int = cx.resolve(int)?;
    let boolean = cx.resolve(boolean)?;
    let float = cx.resolve(float)?;
    let cent = cx.resolve(cent)?;
    assert_eq!(cx.clif_type(int), Some(types::I32));
    assert_eq!(cx.clif_type(boolean), Some(types::I8));
    assert_eq!(cx.clif_type(float), Some(types::F32));
    assert_eq!(cx.clif_type(cent), Some(types::I128));
    Ok(())
}

#[test]
fn real_has_a_value_type_only_when_it_is_quad() -> Result<(), LayoutError> {
    let mut table = TypeTable::new();
    let real = table.basic(BasicKind::Float80);

    let mut x86 = LoweringContext::new(&table, linux_x86_64());
    let lowered = x86.resolve(real)?;
    assert_eq!(x86.clif_type(lowered), None);

    let mut arm = LoweringContext::new(&table, linux_aarch64());
    let lowered = arm.resolve(real)?;
    assert_eq!(arm.clif_type(lowered), Some(types::F128));
    Ok(())
}

#[test]
fn pointers_are_native_integers() -> Result<(), LayoutError> {
    let mut table = TypeTable::new();
    let ch = table.basic(BasicKind::Char);
    let ptr = table.pointer(ch)?;

    let mut wide = LoweringContext::new(&table, linux_x86_64());
    let lowered = wide.resolve(ptr)?;
    assert_eq!(wide.clif_type(lowered), Some(types::I64));

    let mut narrow = LoweringContext::new(&table, linux_i686());
    let lowered = narrow.resolve(ptr)?;
    assert_eq!(narrow.clif_type(lowered), Some(types::I32));
    Ok(())
}

#[test]
fn vectors_become_lane_types() -> Result<(), LayoutError> {
    let mut table = TypeTable::new();
    let float = table.basic(BasicKind::Float32);
    let floats = table.static_array(float, 4)?;
    let float4 = table.vector(floats)?;
    let mut cx = LoweringContext::new(&table, linux_x86_64());

    let lowered = cx.resolve(float4)?;
    assert_eq!(cx.clif_type(lowered), Some(types::F32X4));
    Ok(())
}

#[test]
fn memory_only_types_have_no_value_type() -> Result<(), LayoutError> {
    let mut table = TypeTable::new();
    let cdouble = table.basic(BasicKind::Complex64);
    let int = table.basic(BasicKind::Int32);
    let ints = table.static_array(int, 4)?;
    let point = table.declare_aggregate("Point");
    table.define_aggregate(point, vec![int, int])?;
    let mut cx = LoweringContext::new(&table, linux_x86_64());

    for id in [cdouble, ints, point] {
        let lowered = cx.resolve(id)?;
        assert_eq!(cx.clif_type(lowered), None, "{}", cx.render(lowered));
    }
    Ok(())
}
