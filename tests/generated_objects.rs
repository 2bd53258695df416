//! Generated Objects Test
//!
//! Object dan message yang sama bentuknya dengan output generator untuk
//! simple_test, macro_test, type_test, special_types_test dan
//! annotation_test, diekspresikan lewat `message!` dan `ObjectBuilder`.
//!
//! Usage:
//!   cargo test --test generated_objects

use uidl_runtime::message;
use uidl_runtime::{
    Array, BlobBuf, Call, DecodeError, DispatchError, HandlerResult, Message, MethodOptions, Object, RequestHandle,
    SchemaBuildError, Status, Table, Unspec, WireType, EMPTY_SCHEMA,
};

/// Context per request: mencatat method yang dipanggil
#[derive(Default)]
struct Ctx {
    seen: Vec<String>,
}

fn seen(ctx: &mut Ctx, call: &Call<'_, Ctx>) -> HandlerResult {
    ctx.seen.push(call.method_name().to_string());
    Ok(None)
}

fn raw(fill: impl FnOnce(&mut BlobBuf)) -> Vec<u8> {
    let mut buf = BlobBuf::new();
    fill(&mut buf);
    buf.finish().into_vec()
}

// ============================================================================
// simple_test
// ============================================================================

message! {
    /// `id` optional sebelum `msg` yang required
    pub struct SimpleHello as "hello" {
        optional id: i32 = 0, set_id, clear_id;
        required msg: String = 1, set_msg;
    }
}

message! {
    pub struct HelloCommon as "hello_common" {
        optional id: i32 = 0, set_id, clear_id;
        required msg: String = 1, set_msg;
    }
}

fn simple_hello(ctx: &mut Ctx, call: &Call<'_, Ctx>) -> HandlerResult {
    let args: SimpleHello = call.args_as().map_err(Status::from)?;
    ctx.seen.push(format!("hello:{}", args.msg()));

    let mut reply = HelloCommon::new();
    reply.set_msg(format!("echo {}", args.msg()));
    if let Some(id) = args.id() {
        reply.set_id(*id + 1);
    }
    call.reply(&reply)
}

fn simple_test() -> Object<Ctx> {
    Object::builder("simple_test")
        .plain("hello", simple_hello, SimpleHello::schema())
        .no_arg("hello1", seen)
        .plain("hello2", seen, HelloCommon::schema())
        .plain("hello3", seen, HelloCommon::schema())
        .plain("hello4", seen, HelloCommon::schema())
        .build()
        .unwrap()
}

#[test]
fn test_simple_optional_before_required() {
    let request = raw(|b| b.put("msg", "hi").unwrap());
    let hello = SimpleHello::decode(&request).unwrap();
    assert_eq!(hello.id(), None);
    assert_eq!(hello.msg(), "hi");
    assert!(hello.presence().is_empty());

    let names: Vec<_> = hello.encode().unwrap().attrs().map(|a| a.unwrap().name().to_string()).collect();
    assert_eq!(names, ["msg"]);
}

#[test]
fn test_simple_hello_reply() {
    let object = simple_test();
    let mut ctx = Ctx::default();
    let request = raw(|b| {
        b.put("id", 41i32).unwrap();
        b.put("msg", "ping").unwrap();
    });

    let reply = object
        .dispatch(&mut ctx, RequestHandle(1), "hello", &request)
        .unwrap()
        .expect("hello replies");
    let reply = HelloCommon::decode(reply.as_bytes()).unwrap();
    assert_eq!(reply.id(), Some(&42));
    assert_eq!(reply.msg(), "echo ping");
    assert_eq!(ctx.seen, ["hello:ping"]);
}

#[test]
fn test_simple_missing_required_msg() {
    let object = simple_test();
    let request = raw(|b| b.put("id", 1i32).unwrap());
    let err = object
        .dispatch(&mut Ctx::default(), RequestHandle(1), "hello2", &request)
        .unwrap_err();
    assert_eq!(err, DispatchError::Decode(DecodeError::MissingRequiredField("msg".into())));
    assert_eq!(err.status(), Status::InvalidArgument);
}

#[test]
fn test_simple_shared_schema_across_methods() {
    let object = simple_test();
    let request = raw(|b| b.put("msg", "x").unwrap());
    let mut ctx = Ctx::default();
    for method in ["hello2", "hello3", "hello4"] {
        object.dispatch(&mut ctx, RequestHandle(2), method, &request).unwrap();
    }
    assert_eq!(ctx.seen, ["hello2", "hello3", "hello4"]);
    assert!(std::ptr::eq(
        object.method("hello3").unwrap().schema(),
        object.method("hello4").unwrap().schema()
    ));
}

// ============================================================================
// macro_test / annotation_test
// ============================================================================

message! {
    pub struct MacroHello as "hello" {
        required id: i32 = 0, set_id;
        required msg: String = 1, set_msg;
    }
}

message! {
    pub struct MacroHello5 as "hello5" {
        required id: i32 = 0, set_id;
        optional msg: String = 1, set_msg, clear_msg;
        optional note: String = 2, set_note, clear_note;
    }
}

message! {
    pub struct MacroHello6 as "hello6" {
        required msg: String = 0, set_msg;
    }
}

fn macro_methods(name: &str) -> Object<Ctx> {
    Object::builder(name)
        .method("hello", seen, MacroHello::schema(), MethodOptions { tag: 5, ..MethodOptions::default() })
        .masked("hello5", seen, MacroHello5::schema(), 1)
        .tagged("hello6", seen, MacroHello6::schema(), 10)
        .no_arg("hello7", seen)
        .method("hello8", seen, &EMPTY_SCHEMA, MethodOptions { tag: 15, no_arg: true, ..MethodOptions::default() })
        .method("hello9", seen, &EMPTY_SCHEMA, MethodOptions { tag: 20, no_arg: true, bitmask_limit: Some(0) })
        .build()
        .unwrap()
}

#[test]
fn test_macro_flags_resolved() {
    let object = macro_methods("macro_test");
    let flags: Vec<_> = object
        .methods()
        .iter()
        .map(|m| (m.name(), m.bitmask_limit(), m.tag(), m.is_no_arg()))
        .collect();
    assert_eq!(
        flags,
        [
            ("hello", 0, 5, false),
            ("hello5", 1, 0, false),
            ("hello6", 0, 10, false),
            ("hello7", 0, 0, true),
            ("hello8", 0, 15, true),
            ("hello9", 0, 20, true),
        ]
    );
}

#[test]
fn test_macro_masked_signature() {
    let object = macro_methods("macro_test");
    let hello5 = object.method("hello5").unwrap();
    let signature: Vec<_> = hello5.signature().map(|f| (f.name(), f.wire_type())).collect();
    assert_eq!(signature, [("id", WireType::Int32), ("msg", WireType::String)]);
}

#[test]
fn test_macro_masked_field_invisible_to_handler() {
    fn check(ctx: &mut Ctx, call: &Call<'_, Ctx>) -> HandlerResult {
        let args: MacroHello5 = call.args_as().map_err(Status::from)?;
        ctx.seen.push(format!("{:?}/{:?}", args.msg(), args.note()));
        Ok(None)
    }

    let object = Object::builder("macro_test").masked("hello5", check, MacroHello5::schema(), 1).build().unwrap();
    let request = raw(|b| {
        b.put("id", 5i32).unwrap();
        b.put("msg", "visible").unwrap();
        b.put("note", "hidden").unwrap();
    });
    let mut ctx = Ctx::default();
    object.dispatch(&mut ctx, RequestHandle(3), "hello5", &request).unwrap();
    assert_eq!(ctx.seen, ["Some(\"visible\")/None"]);
}

#[test]
fn test_macro_mask_over_schema_fails_at_registration() {
    let err = Object::<Ctx>::builder("macro_test")
        .masked("hello5", seen, MacroHello5::schema(), 3)
        .build()
        .unwrap_err();
    assert_eq!(
        err,
        SchemaBuildError::BitmaskLimitExceeded {
            method: "hello5".into(),
            limit: 3,
            optional: 2,
        }
    );
}

#[test]
fn test_annotation_object_matches_macro_shape() {
    // annotation_test dideklarasikan dengan annotation, bukan shorthand,
    // tapi method table-nya identik
    let macro_object = macro_methods("macro_test");
    let annotated = macro_methods("annotation_test");
    assert_eq!(macro_object.object_type().id(), macro_methods("macro_test").object_type().id());
    assert_ne!(macro_object.object_type().name(), annotated.object_type().name());

    let request = raw(|b| {
        b.put("id", 1i32).unwrap();
        b.put("msg", "m").unwrap();
    });
    for method in ["hello", "hello5", "hello6", "hello7", "hello8", "hello9"] {
        let a = macro_object.dispatch(&mut Ctx::default(), RequestHandle(1), method, &request);
        let b = annotated.dispatch(&mut Ctx::default(), RequestHandle(1), method, &request);
        assert_eq!(a, b, "method {method}");
    }
}

// ============================================================================
// type_test
// ============================================================================

message! {
    pub struct AllTypes as "all_types" {
        required int8_val: i8 = 0, set_int8_val;
        required int16_val: i16 = 1, set_int16_val;
        required int32_val: i32 = 2, set_int32_val;
        required int64_val: i64 = 3, set_int64_val;
        required bool_val: bool = 4, set_bool_val;
        required double_val: f64 = 5, set_double_val;
        required string_val: String = 6, set_string_val;
    }
}

message! {
    pub struct TypeWithAllTypes as "type_with_all_types" {
        required int8_field: i8 = 0, set_int8_field;
        required int16_field: i16 = 1, set_int16_field;
        required int32_field: i32 = 2, set_int32_field;
        required int64_field: i64 = 3, set_int64_field;
        required bool_field: bool = 4, set_bool_field;
        required double_field: f64 = 5, set_double_field;
        required string_field: String = 6, set_string_field;
        optional optional_int8: i8 = 7, set_optional_int8, clear_optional_int8;
        optional optional_int16: i16 = 8, set_optional_int16, clear_optional_int16;
        optional optional_int32: i32 = 9, set_optional_int32, clear_optional_int32;
        optional optional_int64: i64 = 10, set_optional_int64, clear_optional_int64;
        optional optional_bool: bool = 11, set_optional_bool, clear_optional_bool;
        optional optional_double: f64 = 12, set_optional_double, clear_optional_double;
        optional optional_string: String = 13, set_optional_string, clear_optional_string;
    }
}

fn all_types() -> AllTypes {
    let mut value = AllTypes::new();
    value.set_int8_val(i8::MIN);
    value.set_int16_val(-12_345i16);
    value.set_int32_val(i32::MAX);
    value.set_int64_val(-(1i64 << 40));
    value.set_bool_val(true);
    value.set_double_val(std::f64::consts::PI);
    value.set_string_val("tipe\0lengkap");
    value
}

#[test]
fn test_all_types_roundtrip() {
    let value = all_types();
    let buf = value.encode().unwrap();
    assert_eq!(AllTypes::decode(buf.as_bytes()).unwrap(), value);
}

#[test]
fn test_all_types_wire_tags() {
    let buf = all_types().encode().unwrap();
    let tags: Vec<_> = buf.attrs().map(|a| a.unwrap().tag()).collect();
    assert_eq!(tags, [7, 6, 5, 4, 7, 8, 3]);
}

#[test]
fn test_no_narrowing_between_widths() {
    let request = raw(|b| {
        b.put("int8_val", 1i32).unwrap();
        b.put("int16_val", 1i16).unwrap();
        b.put("int32_val", 1i32).unwrap();
        b.put("int64_val", 1i64).unwrap();
        b.put("bool_val", true).unwrap();
        b.put("double_val", 1.0f64).unwrap();
        b.put("string_val", "s").unwrap();
    });
    assert_eq!(
        AllTypes::decode(&request).unwrap_err(),
        DecodeError::TypeMismatch {
            field: "int8_val".into(),
            expected: WireType::Int8,
            actual: WireType::Int32,
        }
    );
}

#[test]
fn test_bool_from_any_nonzero_byte() {
    let request = raw(|b| {
        b.put("int8_val", 0i8).unwrap();
        b.put("int16_val", 0i16).unwrap();
        b.put("int32_val", 0i32).unwrap();
        b.put("int64_val", 0i64).unwrap();
        b.put("bool_val", 0x40i8).unwrap();
        b.put("double_val", 0.0f64).unwrap();
        b.put("string_val", "").unwrap();
    });
    assert!(*AllTypes::decode(&request).unwrap().bool_val());
}

#[test]
fn test_optional_types_presence() {
    let mut value = TypeWithAllTypes::new();
    value.set_string_field("wajib");
    value.set_optional_int16(-2i16);
    value.set_optional_double(0.5);

    let bits = value.presence().bits();
    assert_eq!(bits, (1 << 1) | (1 << 5));

    let decoded = TypeWithAllTypes::decode(value.encode().unwrap().as_bytes()).unwrap();
    assert_eq!(decoded.presence().bits(), bits);
    assert_eq!(decoded.optional_int16(), Some(&-2));
    assert_eq!(decoded.optional_double(), Some(&0.5));
    assert_eq!(decoded.optional_string(), None);
    assert_eq!(decoded, value);
}

#[test]
fn test_type_test_object_dispatch() {
    fn all_types_handler(_: &mut Ctx, call: &Call<'_, Ctx>) -> HandlerResult {
        let args: AllTypes = call.args_as().map_err(Status::from)?;
        call.reply(&args)
    }

    let object = Object::builder("type_test")
        .plain("all_types", all_types_handler, AllTypes::schema())
        .plain("type_with_all_types", seen, TypeWithAllTypes::schema())
        .build()
        .unwrap();

    let request = all_types().encode().unwrap();
    let reply = object
        .dispatch(&mut Ctx::default(), RequestHandle(7), "all_types", request.as_bytes())
        .unwrap()
        .unwrap();
    assert_eq!(reply, request);
}

// ============================================================================
// special_types_test
// ============================================================================

message! {
    pub struct ArrayParams<'a> as "array" {
        required array_val: Array<'a> = 0, set_array_val;
    }
}

message! {
    pub struct UnspecParams<'a> as "unspec" {
        required unspec_val: Unspec<'a> = 0, set_unspec_val;
    }
}

message! {
    pub struct AllSpecial<'a> as "all_special" {
        required array_val: Array<'a> = 0, set_array_val;
        required unspec_val: Unspec<'a> = 1, set_unspec_val;
        optional table_val: Table<'a> = 2, set_table_val, clear_table_val;
    }
}

message! {
    /// Nested schema untuk `table_val`
    pub struct Point as "point" {
        required x: i32 = 0, set_x;
        required y: i32 = 1, set_y;
    }
}

fn special_request(with_table: bool) -> Vec<u8> {
    raw(|b| {
        let nest = b.open_array("array_val").unwrap();
        b.put("", 10i32).unwrap();
        b.put("", 20i32).unwrap();
        b.close(nest).unwrap();

        b.put_raw("unspec_val", WireType::Unspec, &[0xca, 0xfe]).unwrap();

        if with_table {
            let nest = b.open_table("table_val").unwrap();
            b.put("x", 3i32).unwrap();
            b.put("y", 4i32).unwrap();
            b.close(nest).unwrap();
        }
    })
}

#[test]
fn test_array_passthrough() {
    let request = special_request(false);
    let params = ArrayParams::decode(&request).unwrap();
    let values: Vec<_> = params
        .array_val()
        .iter()
        .map(|a| a.unwrap().value().unwrap().as_i64().unwrap())
        .collect();
    assert_eq!(values, [10, 20]);

    let reencoded = params.encode().unwrap();
    let again = ArrayParams::decode(reencoded.as_bytes()).unwrap();
    assert_eq!(again.array_val().as_bytes(), params.array_val().as_bytes());
}

#[test]
fn test_unspec_bytes_untouched() {
    let request = special_request(false);
    let params = UnspecParams::decode(&request).unwrap();
    assert_eq!(params.unspec_val().as_bytes(), &[0xca, 0xfe]);
}

#[test]
fn test_table_with_nested_schema() {
    let request = special_request(true);
    let params = AllSpecial::decode(&request).unwrap();
    let point: Point = params.table_val().unwrap().decode_as().unwrap();
    assert_eq!((*point.x(), *point.y()), (3, 4));

    let request = special_request(false);
    let without = AllSpecial::decode(&request).unwrap();
    assert_eq!(without.table_val(), None);
}

#[test]
fn test_special_types_roundtrip_by_bytes() {
    let request = special_request(true);
    let params = AllSpecial::decode(&request).unwrap();
    let out = params.encode().unwrap();
    assert_eq!(out.as_bytes(), request.as_slice());
}

#[test]
fn test_special_types_object() {
    fn all_special(ctx: &mut Ctx, call: &Call<'_, Ctx>) -> HandlerResult {
        let args: AllSpecial<'_> = call.args_as().map_err(Status::from)?;
        ctx.seen.push(format!("{}", args.array_val().len()));
        Ok(None)
    }

    let object = Object::builder("special_types_test")
        .plain("array", seen, ArrayParams::schema())
        .plain("unspec", seen, UnspecParams::schema())
        .plain("all_special", all_special, AllSpecial::schema())
        .build()
        .unwrap();

    let mut ctx = Ctx::default();
    object
        .dispatch(&mut ctx, RequestHandle(1), "all_special", &special_request(true))
        .unwrap();
    // 2 element int32: (8 + 4) * 2
    assert_eq!(ctx.seen, ["24"]);
}
