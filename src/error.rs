use std::fmt::Display;
use std::path::PathBuf;
use std::error::Error;

/*
    AstEvent errors
 */
#[derive(Debug, Clone)]
pub enum AstEventError {
    ParsingError,
    HeaderTooShort(usize),
    EmptyChannelMask,
    UnalignedPayload(usize, usize),
}

impl Display for AstEventError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            AstEventError::ParsingError => write!(f, "Error parsing buffer into AstEvent!"),
            AstEventError::HeaderTooShort(len) => write!(f, "Buffer of {} bytes is too short to hold an event header!", len),
            AstEventError::EmptyChannelMask => write!(f, "Event header has no bits set in the channel mask!"),
            AstEventError::UnalignedPayload(len, nchannels) => write!(f, "Payload of {} bytes does not divide evenly over {} channels!", len, nchannels)
        }
    }
}

impl Error for AstEventError {

}

/*
    AstFile errors
 */
#[derive(Debug)]
pub enum AstFileError {
    BadFilePath(PathBuf),
    IOError(std::io::Error),
    TruncatedStream(usize, u64, usize),
    BadEvent(usize, u64, AstEventError)
}

impl From<std::io::Error> for AstFileError {
    fn from(value: std::io::Error) -> Self {
        AstFileError::IOError(value)
    }
}

impl Display for AstFileError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            AstFileError::BadFilePath(path) => write!(f, "File {} does not exist at AstFile::new!", path.display()),
            AstFileError::IOError(e) => write!(f, "AstFile received an io error: {}!", e),
            AstFileError::TruncatedStream(index, offset, requested) => write!(f, "Stream ended early reading event {} at byte offset {} ({} bytes requested)!", index, offset, requested),
            AstFileError::BadEvent(index, offset, e) => write!(f, "Bad event {} at byte offset {} in AstFile! Error: {}", index, offset, e)
        }
    }
}

impl Error for AstFileError {

}

/*
    Run metadata errors
 */
#[derive(Debug)]
pub enum MetadataError {
    BadFilePath(PathBuf),
    BadRunDirectory(PathBuf),
    IOError(std::io::Error),
    ParsingError(serde_json::Error)
}

impl From<std::io::Error> for MetadataError {
    fn from(value: std::io::Error) -> Self {
        MetadataError::IOError(value)
    }
}

impl From<serde_json::Error> for MetadataError {
    fn from(value: serde_json::Error) -> Self {
        MetadataError::ParsingError(value)
    }
}

impl Display for MetadataError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            MetadataError::BadFilePath(path) => write!(f, "Metadata file {} does not exist!", path.display()),
            MetadataError::BadRunDirectory(path) => write!(f, "Could not resolve a run name from directory {}!", path.display()),
            MetadataError::IOError(e) => write!(f, "RunMetadata received an io error: {}", e),
            MetadataError::ParsingError(e) => write!(f, "RunMetadata received a parsing error: {}", e)
        }
    }
}

impl Error for MetadataError {

}

/*
    Occupancy accumulator errors
 */
#[derive(Debug, Clone)]
pub enum AccumulatorError {
    ChannelSetMismatch(usize, u32, u32)
}

impl Display for AccumulatorError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            AccumulatorError::ChannelSetMismatch(index, expected, found) => write!(f, "Event {} reports channel mask {:#010x} but the run started with {:#010x}!", index, found, expected)
        }
    }
}

impl Error for AccumulatorError {

}

/*
    Rate analysis errors
 */
#[derive(Debug, Clone)]
pub enum AnalysisError {
    SampleOutOfRange(usize, u16, u16)
}

impl Display for AnalysisError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            AnalysisError::SampleOutOfRange(channel, sample, max_code) => write!(f, "Channel {} has sample {} outside the ADC range {}!", channel, sample, max_code)
        }
    }
}

impl Error for AnalysisError {

}

/*
    Processor errors
 */
#[derive(Debug)]
pub enum ProcessorError {
    ZleRun,
    MetadataError(MetadataError),
    FileError(AstFileError),
    AccumulatorError(AccumulatorError),
    AnalysisError(AnalysisError)
}

impl From<MetadataError> for ProcessorError {
    fn from(value: MetadataError) -> Self {
        ProcessorError::MetadataError(value)
    }
}

impl From<AstFileError> for ProcessorError {
    fn from(value: AstFileError) -> Self {
        ProcessorError::FileError(value)
    }
}

impl From<AccumulatorError> for ProcessorError {
    fn from(value: AccumulatorError) -> Self {
        ProcessorError::AccumulatorError(value)
    }
}

impl From<AnalysisError> for ProcessorError {
    fn from(value: AnalysisError) -> Self {
        ProcessorError::AnalysisError(value)
    }
}

impl Display for ProcessorError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            ProcessorError::ZleRun => write!(f, "Run was taken with zero-length encoding enabled; the noise analysis needs raw un-suppressed waveforms!"),
            ProcessorError::MetadataError(e) => write!(f, "Processor failed due to metadata error: {}", e),
            ProcessorError::FileError(e) => write!(f, "Processor failed while reading the event stream: {}", e),
            ProcessorError::AccumulatorError(e) => write!(f, "Processor failed while accumulating samples: {}", e),
            ProcessorError::AnalysisError(e) => write!(f, "Processor failed during rate analysis: {}", e)
        }
    }
}

impl Error for ProcessorError {

}
