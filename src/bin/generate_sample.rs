use std::sync::Arc;

use anyhow::{Context, Result};
use arrow::array::{ArrayRef, Float64Array, Int64Array, StringArray};
use arrow::datatypes::{DataType, Field, Schema};
use arrow::record_batch::RecordBatch;
use arrow::util::pretty::pretty_format_batches;
use parquet::arrow::ArrowWriter;

const ROWS: usize = 1100;
const STEM: &str = "StressLevelDataset";

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

    /// Box-Muller transform for normal distribution
    fn gauss(&mut self, mean: f64, std_dev: f64) -> f64 {
        let u1 = self.next_f64().max(1e-15);
        let u2 = self.next_f64();
        let z = (-2.0 * u1.ln()).sqrt() * (2.0 * std::f64::consts::PI * u2).cos();
        mean + std_dev * z
    }

    /// Normal sample rounded and clamped to an integer score range.
    fn score(&mut self, mean: f64, std_dev: f64, max: i64) -> i64 {
        (self.gauss(mean, std_dev).round() as i64).clamp(0, max)
    }

    fn pick<'a>(&mut self, options: &[&'a str]) -> &'a str {
        options[(self.next_u64() % options.len() as u64) as usize]
    }
}

/// One synthetic survey response.
struct Row {
    stress_level: i64,
    anxiety_level: i64,
    self_esteem: i64,
    depression: i64,
    sleep_quality: i64,
    heart_rate: Option<f64>,
    gender: &'static str,
    academic_performance: &'static str,
}

fn generate_rows(rng: &mut SimpleRng) -> Vec<Row> {
    (0..ROWS)
        .map(|_| {
            let stress_level = (rng.next_u64() % 3) as i64;
            let s = stress_level as f64;
            let performance = match stress_level {
                0 => rng.pick(&["high", "high", "medium"]),
                1 => rng.pick(&["medium", "medium", "high", "low"]),
                _ => rng.pick(&["low", "low", "medium"]),
            };
            Row {
                stress_level,
                anxiety_level: rng.score(5.0 + 6.0 * s, 3.0, 21),
                self_esteem: rng.score(24.0 - 7.0 * s, 4.0, 30),
                depression: rng.score(4.0 + 7.0 * s, 3.5, 27),
                sleep_quality: rng.score(4.0 - 1.3 * s, 0.8, 5),
                // About 3% of heart-rate readings are missing.
                heart_rate: (rng.next_f64() > 0.03).then(|| {
                    (rng.gauss(68.0 + 8.0 * s, 6.0) * 10.0).round() / 10.0
                }),
                gender: rng.pick(&["female", "male"]),
                academic_performance: performance,
            }
        })
        .collect()
}

fn to_batch(rows: &[Row]) -> Result<RecordBatch> {
    let ints = |f: fn(&Row) -> i64| -> ArrayRef {
        Arc::new(Int64Array::from(rows.iter().map(f).collect::<Vec<_>>()))
    };
    let texts = |f: fn(&Row) -> &'static str| -> ArrayRef {
        Arc::new(StringArray::from(rows.iter().map(f).collect::<Vec<_>>()))
    };

    let schema = Arc::new(Schema::new(vec![
        Field::new("anxiety_level", DataType::Int64, false),
        Field::new("self_esteem", DataType::Int64, false),
        Field::new("depression", DataType::Int64, false),
        Field::new("sleep_quality", DataType::Int64, false),
        Field::new("heart_rate", DataType::Float64, true),
        Field::new("gender", DataType::Utf8, false),
        Field::new("academic_performance", DataType::Utf8, false),
        Field::new("stress_level", DataType::Int64, false),
    ]));

    RecordBatch::try_new(
        schema,
        vec![
            ints(|r| r.anxiety_level),
            ints(|r| r.self_esteem),
            ints(|r| r.depression),
            ints(|r| r.sleep_quality),
            Arc::new(Float64Array::from(
                rows.iter().map(|r| r.heart_rate).collect::<Vec<_>>(),
            )),
            texts(|r| r.gender),
            texts(|r| r.academic_performance),
            ints(|r| r.stress_level),
        ],
    )
    .context("building record batch")
}

fn write_csv(batch: &RecordBatch, rows: &[Row], path: &str) -> Result<()> {
    let mut writer = csv::Writer::from_path(path).context("creating CSV file")?;
    let schema = batch.schema();
    writer.write_record(schema.fields().iter().map(|f| f.name().as_str()))?;
    for r in rows {
        writer.write_record([
            r.anxiety_level.to_string(),
            r.self_esteem.to_string(),
            r.depression.to_string(),
            r.sleep_quality.to_string(),
            r.heart_rate.map(|v| format!("{v:?}")).unwrap_or_default(),
            r.gender.to_string(),
            r.academic_performance.to_string(),
            r.stress_level.to_string(),
        ])?;
    }
    writer.flush().context("flushing CSV file")?;
    Ok(())
}

fn write_parquet(batch: &RecordBatch, path: &str) -> Result<()> {
    let file = std::fs::File::create(path).context("creating parquet file")?;
    let mut writer = ArrowWriter::try_new(file, batch.schema(), None).context("creating writer")?;
    writer.write(batch).context("writing batch")?;
    writer.close().context("closing writer")?;
    Ok(())
}

fn main() -> Result<()> {
    let mut rng = SimpleRng::new(42);
    let rows = generate_rows(&mut rng);
    let batch = to_batch(&rows)?;

    let csv_path = format!("{STEM}.csv");
    let parquet_path = format!("{STEM}.parquet");
    write_csv(&batch, &rows, &csv_path)?;
    write_parquet(&batch, &parquet_path)?;

    println!("{}", pretty_format_batches(&[batch.slice(0, 5)])?);
    println!("Wrote {} rows to {csv_path} and {parquet_path}", rows.len());
    Ok(())
}
