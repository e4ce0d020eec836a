/// Built-in recognizer backends.
#[cfg(feature = "whisper")]
pub mod whisper;
