use std::collections::HashMap;
use std::sync::Arc;

use anyhow::{Context, Result};
use arrow::array::{ArrayRef, Float32Array, Float64Array, Int32Array, Int64Array};
use arrow::datatypes::{DataType, Field, Schema};
use arrow::record_batch::RecordBatch;
use parquet::arrow::ArrowWriter;

use tickframe::data::encoding::{EncodingTag, ENCODING_TAG_ATTR, LABELS_ATTR};
use tickframe::NA_PRICE;

/// Minimal deterministic PRNG (xoshiro256**)
struct SimpleRng {
    state: [u64; 4],
}

impl SimpleRng {
    fn new(seed: u64) -> Self {
        let mut s = [0u64; 4];
        let mut x = seed;
        for slot in &mut s {
            x = x.wrapping_mul(6364136223846793005).wrapping_add(1);
            *slot = x;
        }
        SimpleRng { state: s }
    }

    fn next_u64(&mut self) -> u64 {
        let result = (self.state[1].wrapping_mul(5))
            .rotate_left(7)
            .wrapping_mul(9);
        let t = self.state[1] << 17;
        self.state[2] ^= self.state[0];
        self.state[3] ^= self.state[1];
        self.state[1] ^= self.state[2];
        self.state[0] ^= self.state[3];
        self.state[2] ^= t;
        self.state[3] = self.state[3].rotate_left(45);
        result
    }

    fn next_f64(&mut self) -> f64 {
        (self.next_u64() >> 11) as f64 / (1u64 << 53) as f64
    }

    fn below(&mut self, n: u64) -> u64 {
        self.next_u64() % n
    }
}

fn tagged_field(name: &str, data_type: DataType, tag: EncodingTag, labels: Option<&[&str]>) -> Field {
    let mut metadata = HashMap::from([(ENCODING_TAG_ATTR.to_string(), (tag as u8).to_string())]);
    if let Some(labels) = labels {
        metadata.insert(LABELS_ATTR.to_string(), serde_json::json!([labels]).to_string());
    }
    Field::new(name, data_type, false).with_metadata(metadata)
}

fn main() -> Result<()> {
    env_logger::init();
    let mut rng = SimpleRng::new(42);

    const ROWS: usize = 1_000;
    const FIXED_POINT: f64 = 10_000_000.0;
    let symbols = ["AAPL", "MSFT", "NVDA"];
    let sides = ["B", "S"];

    // 2017-03-15 09:30:00 UTC
    let open_ns: i64 = 1_489_570_200_000_000_000;

    let mut ts = Vec::with_capacity(ROWS);
    let mut symbol = Vec::with_capacity(ROWS);
    let mut side = Vec::with_capacity(ROWS);
    let mut px_bid = Vec::with_capacity(ROWS);
    let mut px_ask = Vec::with_capacity(ROWS);
    let mut qty = Vec::with_capacity(ROWS);
    let mut weight = Vec::with_capacity(ROWS);
    let mut spread_bp = Vec::with_capacity(ROWS);
    let mut seq = Vec::with_capacity(ROWS);

    let mut now = open_ns;
    let mut mid = 140.0;
    for row in 0..ROWS {
        now += 1_000_000 + rng.below(50_000_000) as i64;
        mid += (rng.next_f64() - 0.5) * 0.05;
        let half_spread = 0.005 + rng.next_f64() * 0.02;

        ts.push(now);
        symbol.push(rng.below(symbols.len() as u64) as i32);
        side.push(rng.below(sides.len() as u64) as i32);
        px_bid.push(((mid - half_spread) * FIXED_POINT).round() as i64);
        // every 97th quote has no ask
        if row % 97 == 0 {
            px_ask.push(NA_PRICE as i64);
        } else {
            px_ask.push(((mid + half_spread) * FIXED_POINT).round() as i64);
        }
        qty.push(100 * (1 + rng.below(20) as i32));
        weight.push(rng.next_f64() as f32);
        spread_bp.push(2.0 * half_spread / mid * 10_000.0);
        seq.push(row as i64);
    }

    let fields = vec![
        tagged_field("ts", DataType::Int64, EncodingTag::Timestamp, None),
        tagged_field("symbol", DataType::Int32, EncodingTag::Category, Some(&symbols[..])),
        tagged_field("side", DataType::Int32, EncodingTag::Category, Some(&sides[..])),
        tagged_field("px_bid", DataType::Int64, EncodingTag::Int64, None),
        tagged_field("px_ask", DataType::Int64, EncodingTag::Int64, None),
        tagged_field("qty", DataType::Int32, EncodingTag::Int32, None),
        tagged_field("weight", DataType::Float32, EncodingTag::Float32, None),
        tagged_field("spread_bp", DataType::Float64, EncodingTag::Float64, None),
        tagged_field("seq", DataType::Int64, EncodingTag::Int64, None),
    ];
    let columns: Vec<ArrayRef> = vec![
        Arc::new(Int64Array::from(ts)),
        Arc::new(Int32Array::from(symbol)),
        Arc::new(Int32Array::from(side)),
        Arc::new(Int64Array::from(px_bid)),
        Arc::new(Int64Array::from(px_ask)),
        Arc::new(Int32Array::from(qty)),
        Arc::new(Float32Array::from(weight)),
        Arc::new(Float64Array::from(spread_bp)),
        Arc::new(Int64Array::from(seq)),
    ];

    let schema = Arc::new(Schema::new(fields));
    let batch = RecordBatch::try_new(schema.clone(), columns).context("building record batch")?;

    let output_path = "sample_ticks.parquet";
    let file = std::fs::File::create(output_path).context("creating output file")?;
    let mut writer = ArrowWriter::try_new(file, schema, None).context("creating writer")?;
    writer.write(&batch).context("writing batch")?;
    writer.close().context("closing writer")?;

    println!("Wrote {ROWS} quotes to {output_path}");
    println!("Try: tickframe {output_path} --index ts --prices px_");
    Ok(())
}
