//! uidl-runtime demo
//!
//! Registrasi satu object dengan keempat shorthand, jalankan skenario
//! dasar lewat `dispatch`, lalu ukur latency decode/encode/dispatch.
//!
//! Usage:
//!   cargo run --release --bin uidl_demo

use std::time::Instant;

use thiserror::Error;
use tracing::info;
use tracing_subscriber::EnvFilter;

use uidl_runtime::message;
use uidl_runtime::{
    BlobBuf, Call, DecodeError, DispatchError, EncodeError, HandlerResult, Message, Object, RequestHandle,
    SchemaBuildError, Status,
};

message! {
    /// Argumen `hello`: dua field required
    pub struct Hello as "hello" {
        required id: i32 = 0, set_id;
        required msg: String = 1, set_msg;
    }
}

message! {
    /// Argumen `greet`: `lang` disembunyikan oleh method masked
    pub struct Greet as "greet" {
        required id: i32 = 0, set_id;
        optional msg: String = 1, set_msg, clear_msg;
        optional lang: String = 2, set_lang, clear_lang;
    }
}

#[derive(Debug, Error)]
enum DemoError {
    #[error("registration failed: {0}")]
    Schema(#[from] SchemaBuildError),

    #[error("dispatch failed: {0}")]
    Dispatch(#[from] DispatchError),

    #[error("decode failed: {0}")]
    Decode(#[from] DecodeError),

    #[error("encode failed: {0}")]
    Encode(#[from] EncodeError),

    #[error("`{0}` returned no reply")]
    NoReply(&'static str),
}

/// Context per koneksi
#[derive(Default)]
struct Session {
    calls: u64,
}

fn hello(session: &mut Session, call: &Call<'_, Session>) -> HandlerResult {
    session.calls += 1;
    let args: Hello = call.args_as().map_err(Status::from)?;
    let mut reply = Greet::new();
    reply.set_id(*args.id());
    reply.set_msg(format!("hello, {}", args.msg()));
    call.reply(&reply)
}

fn greet(session: &mut Session, call: &Call<'_, Session>) -> HandlerResult {
    session.calls += 1;
    let args: Greet = call.args_as().map_err(Status::from)?;
    let mut reply = Greet::new();
    reply.set_id(*args.id());
    if let Some(msg) = args.msg() {
        reply.set_msg(msg.clone());
    }
    if let Some(lang) = args.lang() {
        reply.set_lang(lang.clone());
    }
    call.reply(&reply)
}

fn status(session: &mut Session, _: &Call<'_, Session>) -> HandlerResult {
    session.calls += 1;
    Ok(None)
}

fn build_object() -> Result<Object<Session>, SchemaBuildError> {
    Object::builder("demo")
        .object_type("demo_object")
        .plain("hello", hello, Hello::schema())
        .tagged("hello_tagged", hello, Hello::schema(), 5)
        .masked("greet_short", greet, Greet::schema(), 1)
        .plain("greet", greet, Greet::schema())
        .no_arg("status", status)
        .build()
}

fn run_scenarios(object: &Object<Session>) -> Result<(), DemoError> {
    println!("📋 Scenarios");
    println!("------------");

    let mut session = Session::default();

    // A: semua field required ada
    let mut request = Hello::new();
    request.set_id(7);
    request.set_msg("hi");
    let raw = request.encode()?;
    let reply = object
        .dispatch(&mut session, RequestHandle(1), "hello", raw.as_bytes())?
        .ok_or(DemoError::NoReply("hello"))?;
    let reply = Greet::decode(reply.as_bytes())?;
    println!("  A hello        → id={} msg={:?}", reply.id(), reply.msg());

    // B: optional field tidak dikirim
    let mut request = Greet::new();
    request.set_id(7);
    let raw = request.encode()?;
    let reply = object
        .dispatch(&mut session, RequestHandle(2), "greet", raw.as_bytes())?
        .ok_or(DemoError::NoReply("greet"))?;
    let reply = Greet::decode(reply.as_bytes())?;
    println!("  B greet        → id={} msg={:?} presence={:?}", reply.id(), reply.msg(), reply.presence());

    // C: required field hilang
    let err = object.dispatch(&mut session, RequestHandle(3), "hello", &[]);
    match err {
        Err(e) => println!("  C hello {{}}     → {} (status {})", e, e.status()),
        Ok(_) => println!("  C hello {{}}     → unexpectedly accepted"),
    }

    // D: method tanpa argumen, buffer diabaikan
    let object_calls = session.calls;
    object.dispatch(&mut session, RequestHandle(4), "status", raw.as_bytes())?;
    println!("  D status       → handler invoked: {}", session.calls > object_calls);

    // Masked: `lang` tidak terlihat oleh greet_short
    let mut request = Greet::new();
    request.set_id(9);
    request.set_msg("short");
    request.set_lang("id");
    let raw = request.encode()?;
    let reply = object
        .dispatch(&mut session, RequestHandle(5), "greet_short", raw.as_bytes())?
        .ok_or(DemoError::NoReply("greet_short"))?;
    let reply = Greet::decode(reply.as_bytes())?;
    println!("  masked         → msg={:?} lang={:?}\n", reply.msg(), reply.lang());

    Ok(())
}

fn benchmark_codec() -> Result<(), DemoError> {
    println!("📊 Codec Benchmark");
    println!("------------------");

    const ITERATIONS: usize = 1_000_000;

    let mut value = Greet::new();
    value.set_id(42);
    value.set_msg("benchmark payload");
    value.set_lang("en");
    let encoded = value.encode()?;

    let start = Instant::now();
    for _ in 0..ITERATIONS {
        std::hint::black_box(value.encode()?);
    }
    let encode_duration = start.elapsed();

    let start = Instant::now();
    for _ in 0..ITERATIONS {
        std::hint::black_box(Greet::decode(encoded.as_bytes())?);
    }
    let decode_duration = start.elapsed();

    let encode_ns = encode_duration.as_nanos() as f64 / ITERATIONS as f64;
    let decode_ns = decode_duration.as_nanos() as f64 / ITERATIONS as f64;

    println!("  Message size: {} bytes", encoded.len());
    println!("  Operations: {}", ITERATIONS);
    println!("  Encode latency: {:.2} ns/op ({:.3} μs/op)", encode_ns, encode_ns / 1000.0);
    println!("  Decode latency: {:.2} ns/op ({:.3} μs/op)", decode_ns, decode_ns / 1000.0);
    println!(
        "  Decode throughput: {:.2} MB/sec\n",
        (ITERATIONS * encoded.len()) as f64 / decode_duration.as_secs_f64() / 1_000_000.0
    );

    Ok(())
}

fn benchmark_dispatch(object: &Object<Session>) -> Result<(), DemoError> {
    println!("📊 Dispatch Benchmark");
    println!("---------------------");

    const ITERATIONS: usize = 500_000;

    let mut buf = BlobBuf::new();
    buf.put("id", 1i32)?;
    buf.put("msg", "bench")?;
    buf.put("lang", "en")?;
    let request = buf.finish();

    let mut session = Session::default();
    for method in ["greet", "greet_short", "status"] {
        let start = Instant::now();
        for i in 0..ITERATIONS {
            object.dispatch(&mut session, RequestHandle(i as u32), method, request.as_bytes())?;
        }
        let ns = start.elapsed().as_nanos() as f64 / ITERATIONS as f64;
        println!("  {:<12} {:.2} ns/op ({:.3} μs/op)", method, ns, ns / 1000.0);
    }
    println!("  Handled: {} calls", session.calls);

    Ok(())
}

fn run() -> Result<(), DemoError> {
    let object = build_object()?;
    info!(
        object = object.name(),
        type_id = object.object_type().id(),
        methods = object.methods().len(),
        "object ready"
    );

    for method in object.methods() {
        let signature: Vec<String> = method
            .signature()
            .map(|f| format!("{}:{}{}", f.name(), f.wire_type(), if f.is_required() { "" } else { "?" }))
            .collect();
        println!("  {:<12} tag={:<3} [{}]", method.name(), method.tag(), signature.join(", "));
    }
    println!();

    run_scenarios(&object)?;
    benchmark_codec()?;
    benchmark_dispatch(&object)?;
    Ok(())
}

fn main() {
    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")))
        .init();

    println!("🚀 uidl-runtime demo");
    println!("====================\n");

    if let Err(e) = run() {
        eprintln!("❌ Demo error: {}", e);
        std::process::exit(1);
    }

    println!("\n✅ All scenarios complete!");
}
