mod analyze;
pub use analyze::detect_sector;

mod buffer;
pub use buffer::DataBuffer;

mod ecc;
pub use ecc::{edc_checksum, EccCodec};

mod encode;
pub use encode::{encode_sector, encoded_sector_size};

mod lib_error_handling;
pub use lib_error_handling::Ecm2Error;

mod lib_structs;
pub use lib_structs::{
    MsfTime, SectorType, IMAGE_START_SECTOR, SECTOR_SIZE, SYNC_PATTERN,
};

mod mapper;
pub use mapper::{best_count_width, pack_index, unpack_index};

mod optimize;
pub use optimize::{refine_optimizations, Optimizations};

mod reconstruction;
pub use reconstruction::decode_sector;

mod stream;
pub use stream::Ecm2Processor;

#[cfg(test)]
mod test_support;
