
//Binary layout of one event record in a .ast file
pub const HEADER_SIZE_BYTES: usize = 20;
pub const BYTES_PER_SAMPLE: usize = 2;
pub const ZLE_FLAG_MASK: u32 = 0x80000000;
pub const EVENT_SIZE_MASK: u32 = 0x7FFFFFFF;

//Digitizer characteristics
pub const ADC_RANGE: u16 = 16384; //14 bit codes
pub const REFERENCE_BASELINE: u16 = 16000;
pub const SAMPLE_PERIOD_SECONDS: f64 = 1.0e-8;
pub const SAMPLE_PERIOD_MS: f64 = 1.0e-5;

//Rate jump marking the edge of the noise band (Hz), overridable from the command line
pub const DEFAULT_RATE_JUMP_HZ: f64 = 200.0;
