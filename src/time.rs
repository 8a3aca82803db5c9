use chrono::FixedOffset;

/// The community runs on Japanese time: counter epochs, posting slots
/// and every user-facing timestamp are computed in JST.
pub fn jst() -> FixedOffset {
	FixedOffset::east_opt(9 * 3600).unwrap()
}

#[macro_export]
macro_rules! timed {
	($label:expr, $code:block) => {{
		use std::time::Instant;
		let start = Instant::now();
		let result = { $code };
		let duration = start.elapsed();
		println!("📊 {}: {:?}", $label, duration);
		result
	}};
}
