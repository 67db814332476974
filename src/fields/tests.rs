use crate::error::Error;
use crate::fields::{CopyPlan, FieldAccessor, FieldType, NumericKind, Value};

#[test]
fn integer_fields_round_trip() {
    let mut buf = [0u8; 32];
    let cases = [
        (FieldType::Int8, 0, -100i64),
        (FieldType::Int16, 2, -30_000),
        (FieldType::Uint16, 4, 65_000),
        (FieldType::Int32, 8, -2_000_000_000),
        (FieldType::Int64, 16, i64::MIN + 7),
    ];
    for (ty, offset, v) in cases {
        let field = FieldAccessor::new(ty, offset);
        field.set_int(&mut buf, v).unwrap();
        assert_eq!(field.get_int(&buf).unwrap(), v);
    }
}

#[test]
fn real_fields_round_trip() {
    let mut buf = [0u8; 16];
    let f32_field = FieldAccessor::new(FieldType::Float32, 0);
    f32_field.set_real(&mut buf, 1.5).unwrap();
    assert_eq!(f32_field.get_real(&buf).unwrap(), 1.5);

    let f64_field = FieldAccessor::new(FieldType::Float64, 8);
    f64_field.set_real(&mut buf, -0.001).unwrap();
    assert_eq!(f64_field.get_real(&buf).unwrap(), -0.001);
}

#[test]
fn strict_access_rejects_cross_kind_use() {
    let mut buf = [0u8; 8];
    let int_field = FieldAccessor::new(FieldType::Int32, 0);
    let real_field = FieldAccessor::new(FieldType::Float32, 4);

    assert!(matches!(
        int_field.get_real(&buf),
        Err(Error::TypeMismatch {
            requested: NumericKind::Real,
            actual: NumericKind::Integer,
        })
    ));
    assert!(matches!(
        real_field.get_int(&buf),
        Err(Error::TypeMismatch { .. })
    ));
    assert!(int_field.set_real(&mut buf, 1.0).is_err());
    assert!(real_field.set_int(&mut buf, 1).is_err());
}

#[test]
fn converting_write_truncates_reals_toward_zero() {
    let mut buf = [0u8; 4];
    let field = FieldAccessor::new(FieldType::Int32, 0);
    field.write(&mut buf, Value::Real(3.9));
    assert_eq!(field.get_int(&buf).unwrap(), 3);
    field.write(&mut buf, Value::Real(-3.9));
    assert_eq!(field.get_int(&buf).unwrap(), -3);
}

#[test]
fn converting_write_saturates_out_of_range_reals() {
    let mut buf = [0u8; 8];
    let field = FieldAccessor::new(FieldType::Int64, 0);
    field.write(&mut buf, Value::Real(1.0e300));
    assert_eq!(field.get_int(&buf).unwrap(), i64::MAX);
    field.write(&mut buf, Value::Real(-1.0e300));
    assert_eq!(field.get_int(&buf).unwrap(), i64::MIN);
}

#[test]
fn converting_write_widens_integers_to_reals() {
    let mut buf = [0u8; 8];
    let field = FieldAccessor::new(FieldType::Float64, 0);
    field.write(&mut buf, Value::Int(-42));
    assert_eq!(field.get_real(&buf).unwrap(), -42.0);
}

#[test]
fn narrowing_integer_write_wraps_like_a_cast() {
    let mut buf = [0u8; 2];
    let field = FieldAccessor::new(FieldType::Int16, 0);
    field.write(&mut buf, Value::Int(70_000));
    assert_eq!(field.get_int(&buf).unwrap(), 70_000i64 as i16 as i64);
}

#[test]
fn relocated_keeps_shape_and_moves_offset() {
    let field = FieldAccessor::new(FieldType::Uint16, 114);
    let moved = field.relocated(6);
    assert_eq!(moved.offset(), 6);
    assert_eq!(moved.size(), 2);
    assert_eq!(moved.field_type(), FieldType::Uint16);
    assert_eq!(moved.kind(), NumericKind::Integer);
}

#[test]
fn copy_plan_rejects_size_mismatch() {
    let mut plan = CopyPlan::new();
    let from = FieldAccessor::new(FieldType::Int16, 0);
    let to = FieldAccessor::new(FieldType::Int32, 0);
    assert!(matches!(
        plan.append(from, to),
        Err(Error::SizeMismatch { from: 2, to: 4 })
    ));
    assert!(plan.is_empty());
}

#[test]
fn copy_plan_transfers_and_converts() {
    let mut plan = CopyPlan::new();
    // same-size pairs: i32 -> i32, i32 -> f32, f32 -> i32
    plan.append(
        FieldAccessor::new(FieldType::Int32, 0),
        FieldAccessor::new(FieldType::Int32, 0),
    )
    .unwrap();
    plan.append(
        FieldAccessor::new(FieldType::Int32, 4),
        FieldAccessor::new(FieldType::Float32, 4),
    )
    .unwrap();
    plan.append(
        FieldAccessor::new(FieldType::Float32, 8),
        FieldAccessor::new(FieldType::Int32, 8),
    )
    .unwrap();
    assert_eq!(plan.len(), 3);

    let mut src = [0u8; 12];
    FieldAccessor::new(FieldType::Int32, 0)
        .set_int(&mut src, 7)
        .unwrap();
    FieldAccessor::new(FieldType::Int32, 4)
        .set_int(&mut src, -9)
        .unwrap();
    FieldAccessor::new(FieldType::Float32, 8)
        .set_real(&mut src, 2.75)
        .unwrap();

    let mut dst = [0u8; 12];
    plan.apply(&src, &mut dst);
    assert_eq!(
        FieldAccessor::new(FieldType::Int32, 0).get_int(&dst).unwrap(),
        7
    );
    assert_eq!(
        FieldAccessor::new(FieldType::Float32, 4)
            .get_real(&dst)
            .unwrap(),
        -9.0
    );
    assert_eq!(
        FieldAccessor::new(FieldType::Int32, 8).get_int(&dst).unwrap(),
        2
    );
}
