//! Self- and mutually-referential descriptor graphs.

mod common;

use common::*;
use tessera_hir::{BasicKind, TypeId, TypeKind, TypeTable};
use tessera_layout::{
    AggregateLowering, LayoutError, LoweredType, LoweredTypeId, LoweringContext, Pointee,
};

/// `struct Node { Node* next; int value; }`
fn linked_list(table: &mut TypeTable) -> (TypeId, TypeId, TypeId) {
    let node = table.declare_aggregate("Node");
    let next = table.pointer(node).unwrap();
    let int = table.basic(BasicKind::Int32);
    table.define_aggregate(node, vec![next, int]).unwrap();
    (node, next, int)
}

#[test]
fn pointer_to_self_referential_record() -> Result<(), LayoutError> {
    let mut table = TypeTable::new();
    let (node, next, int) = linked_list(&mut table);
    let mut cx = LoweringContext::new(&table, linux_x86_64());

    let ptr = cx.resolve(next)?;
    let record = cx.lookup(node)?.expect("record is declared while lowering the pointer");
    let value = cx.lookup(int)?.expect("members are lowered with the record");

    assert_eq!(cx.get(ptr), Some(&LoweredType::Pointer(Pointee::Type(record))));
    assert_eq!(cx.record_body(record), Some(&[ptr, value][..]));
    // Node*, Node, int: one entry each, and the outer candidate was dropped.
    assert_eq!(cx.cache().len(), 3);
    assert_eq!(cx.lowered().len(), 3);
    assert_eq!(cx.cache().stats().discarded, 1);
    assert_eq!(cx.resolve(next)?, ptr);
    Ok(())
}

#[test]
fn record_first_needs_no_discard() -> Result<(), LayoutError> {
    let mut table = TypeTable::new();
    let (node, next, _) = linked_list(&mut table);
    let mut cx = LoweringContext::new(&table, linux_x86_64());

    let record = cx.resolve(node)?;
    let ptr = cx.lookup(next)?.expect("member pointer is lowered with the record");
    assert_eq!(cx.get(ptr).and_then(LoweredType::as_pointer), Some(Pointee::Type(record)));
    assert_eq!(cx.cache().stats().discarded, 0);
    assert_eq!(cx.render(ptr), "%Node*");
    Ok(())
}

#[test]
fn static_array_of_pointers_back_to_the_record() -> Result<(), LayoutError> {
    // struct Tree { Tree*[2] children; }
    let mut table = TypeTable::new();
    let tree = table.declare_aggregate("Tree");
    let link = table.pointer(tree)?;
    let children = table.static_array(link, 2)?;
    table.define_aggregate(tree, vec![children])?;
    let mut cx = LoweringContext::new(&table, linux_x86_64());

    let lowered = cx.resolve(children)?;
    let record = cx.lookup(tree)?.unwrap();
    assert_eq!(cx.record_body(record), Some(&[lowered][..]));
    assert_eq!(cx.render(lowered), "[2 x %Tree*]");
    assert_eq!(cx.cache().len(), 3);
    assert_eq!(cx.lowered().len(), 3);
    assert_eq!(cx.cache().stats().discarded, 2);
    Ok(())
}

#[test]
fn dynamic_array_of_the_record() -> Result<(), LayoutError> {
    // struct Menu { Menu[] items; }
    let mut table = TypeTable::new();
    let menu = table.declare_aggregate("Menu");
    let items = table.dynamic_array(menu)?;
    table.define_aggregate(menu, vec![items])?;
    let mut cx = LoweringContext::new(&table, linux_x86_64());

    let lowered = cx.resolve(items)?;
    let record = cx.lookup(menu)?.unwrap();
    assert_eq!(cx.record_body(record), Some(&[lowered][..]));
    assert_eq!(cx.render(lowered), "{ i64, %Menu* }");
    assert_eq!(cx.cache().len(), 2);
    assert_eq!(cx.cache().stats().discarded, 1);
    Ok(())
}

#[test]
fn vector_of_pointers_back_to_the_record() -> Result<(), LayoutError> {
    // struct Packet { __vector(Packet*[4]) peers; }
    let mut table = TypeTable::new();
    let packet = table.declare_aggregate("Packet");
    let peer = table.pointer(packet)?;
    let peers = table.static_array(peer, 4)?;
    let lanes = table.vector(peers)?;
    table.define_aggregate(packet, vec![lanes])?;
    let mut cx = LoweringContext::new(&table, linux_x86_64());

    let lowered = cx.resolve(lanes)?;
    assert_eq!(cx.render(lowered), "<4 x %Packet*>");
    assert_eq!(cx.get(lowered).and_then(LoweredType::as_vector).map(|(n, _)| n), Some(4));
    // Packet*, Packet and the vector; the array itself is never lowered.
    assert_eq!(cx.cache().len(), 3);
    assert_eq!(cx.cache().stats().discarded, 2);
    Ok(())
}

#[test]
fn mutually_recursive_records() -> Result<(), LayoutError> {
    // struct A { B* b; }  struct B { A* a; }
    let mut table = TypeTable::new();
    let a = table.declare_aggregate("A");
    let b = table.declare_aggregate("B");
    let a_ptr = table.pointer(a)?;
    let b_ptr = table.pointer(b)?;
    table.define_aggregate(a, vec![b_ptr])?;
    table.define_aggregate(b, vec![a_ptr])?;
    let mut cx = LoweringContext::new(&table, linux_x86_64());

    let lowered = cx.resolve(a_ptr)?;
    let a_record = cx.lookup(a)?.unwrap();
    let b_record = cx.lookup(b)?.unwrap();
    let b_lowered = cx.lookup(b_ptr)?.unwrap();
    assert_eq!(cx.record_body(a_record), Some(&[b_lowered][..]));
    assert_eq!(cx.record_body(b_record), Some(&[lowered][..]));
    assert_eq!(cx.cache().len(), 4);
    assert_eq!(cx.cache().stats().discarded, 1);
    Ok(())
}

#[test]
fn opaque_records_have_no_body() -> Result<(), LayoutError> {
    let mut table = TypeTable::new();
    let handle = table.declare_aggregate("Handle");
    let ptr = table.pointer(handle)?;
    let mut cx = LoweringContext::new(&table, linux_x86_64());

    let lowered = cx.resolve(ptr)?;
    let record = cx.lookup(handle)?.unwrap();
    assert_eq!(cx.record_body(record), None);
    assert_eq!(cx.render(lowered), "%Handle*");
    Ok(())
}

/// Lowers members before declaring, which the seam forbids.
struct MembersFirst;

impl AggregateLowering for MembersFirst {
    fn lower_aggregate(
        &self,
        cx: &mut LoweringContext<'_>,
        id: TypeId,
    ) -> Result<LoweredTypeId, LayoutError> {
        let Some(TypeKind::Aggregate(def)) = cx.table().get(id) else {
            return Err(LayoutError::UnknownDescriptor(id));
        };
        for member in def.fields.iter().flatten() {
            cx.resolve(*member)?;
        }
        cx.declare(id, LoweredType::Record { name: def.name.clone() })
    }
}

#[test]
fn undeclared_cycles_are_reported() {
    let mut table = TypeTable::new();
    let (node, _, _) = linked_list(&mut table);
    let mut cx = LoweringContext::with_aggregates(&table, linux_x86_64(), &MembersFirst);

    assert!(matches!(cx.resolve(node), Err(LayoutError::UnresolvableCycle(id)) if id == node));
    assert!(cx.cache().is_empty());
}

/// Returns some other entry instead of declaring its own.
struct Forgetful;

impl AggregateLowering for Forgetful {
    fn lower_aggregate(
        &self,
        cx: &mut LoweringContext<'_>,
        id: TypeId,
    ) -> Result<LoweredTypeId, LayoutError> {
        let stand_in = cx
            .table()
            .iter()
            .find(|(_, kind)| matches!(kind, TypeKind::Basic(_)))
            .map(|(id, _)| id)
            .ok_or(LayoutError::UnknownDescriptor(id))?;
        cx.resolve(stand_in)
    }
}

#[test]
fn aggregates_must_declare_themselves() {
    let mut table = TypeTable::new();
    let (node, _, _) = linked_list(&mut table);
    let mut cx = LoweringContext::with_aggregates(&table, linux_x86_64(), &Forgetful);

    assert!(matches!(cx.resolve(node), Err(LayoutError::UndeclaredAggregate(id)) if id == node));
    assert_eq!(cx.lookup(node).unwrap(), None);
}

#[test]
fn record_bodies_are_write_once() -> Result<(), LayoutError> {
    let mut table = TypeTable::new();
    let (node, _, _) = linked_list(&mut table);
    let mut cx = LoweringContext::new(&table, linux_x86_64());

    let record = cx.resolve(node)?;
    assert!(matches!(
        cx.define_record_body(record, vec![]),
        Err(LayoutError::RecordRedefined(id)) if id == record
    ));
    assert_eq!(cx.record_body(record).map(<[_]>::len), Some(2));
    Ok(())
}

/// `struct S { S* self_; int value; __vector(int) bad; }`
fn record_with_a_bad_member(
    table: &mut TypeTable,
) -> Result<(TypeId, TypeId, TypeId), LayoutError> {
    let s = table.declare_aggregate("S");
    let s_ptr = table.pointer(s)?;
    let int = table.basic(BasicKind::Int32);
    let bad = table.vector(int)?;
    table.define_aggregate(s, vec![s_ptr, int, bad])?;
    Ok((s, s_ptr, int))
}

#[test]
fn failed_record_is_not_left_declared() -> Result<(), LayoutError> {
    let mut table = TypeTable::new();
    let (s, s_ptr, _) = record_with_a_bad_member(&mut table)?;
    let mut cx = LoweringContext::new(&table, linux_x86_64());

    for _ in 0..2 {
        assert!(matches!(cx.resolve(s), Err(LayoutError::MalformedVector { .. })));
        assert_eq!(cx.lookup(s)?, None);
        assert_eq!(cx.lookup(s_ptr)?, None);
        assert!(cx.cache().is_empty());
        assert!(cx.lowered().is_empty());
    }
    Ok(())
}

#[test]
fn failure_through_a_pointer_rolls_back_the_record() -> Result<(), LayoutError> {
    let mut table = TypeTable::new();
    let (s, s_ptr, int) = record_with_a_bad_member(&mut table)?;
    let mut cx = LoweringContext::new(&table, linux_x86_64());

    let value = cx.resolve(int)?;
    assert!(matches!(cx.resolve(s_ptr), Err(LayoutError::MalformedVector { .. })));
    assert_eq!(cx.lookup(s)?, None);
    assert_eq!(cx.lookup(s_ptr)?, None);
    // Entries finished before the failing request survive it.
    assert_eq!(cx.lookup(int)?, Some(value));
    assert_eq!(cx.cache().len(), 1);
    assert_eq!(cx.lowered().len(), 1);
    assert!(matches!(cx.resolve(s), Err(LayoutError::MalformedVector { .. })));
    Ok(())
}
