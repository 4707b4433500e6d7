//! The encode mode: disc image in, encoded container out.
//!
//! Encoding runs two passes over the image, both in fixed-size sector
//! batches. The analysis pass classifies every sector and narrows the
//! proposed optimization mask to what the whole stream tolerates; only
//! after the full index is known can the header be written, because it
//! persists the final mask and the packed index. The emission pass then
//! rereads the image and appends the encoded sectors.

use std::io::{BufReader, BufWriter, Read, Seek, SeekFrom, Write};
use std::time::Instant;

use ecm2::{
    best_count_width, pack_index, DataBuffer, Ecm2Processor, Optimizations,
    SectorType, IMAGE_START_SECTOR, SECTOR_SIZE,
};
use tracing::{debug, info};

use crate::arg_handling::Args;
use crate::error_handling::CliError;
use crate::modes::{progress_bar, BUFFER_SECTORS};
use crate::storage_io::{
    create_output, open_input, write_container_header, StreamConfig,
};

pub fn run_encode(args: &Args) -> Result<(), CliError> {
    let started = Instant::now();

    let (input_file, input_size) = open_input(&args.input)?;
    if input_size == 0 || input_size % SECTOR_SIZE as u64 != 0 {
        return Err(CliError::InvalidImage(format!(
            "{} is not a multiple of the 2352-byte sector size.",
            args.input.display(),
        )));
    }
    let sectors = (input_size / SECTOR_SIZE as u64) as u32;
    let mut reader = BufReader::new(input_file);

    let processor = Ecm2Processor::new();
    let mut options = Optimizations::all();
    let mut full_index: DataBuffer<SectorType> =
        DataBuffer::new(sectors as usize);

    info!(
        "Analyzing {} sectors to determine the best optimizations.",
        sectors
    );
    let analysis_bar = progress_bar(sectors as u64, args.quiet, "Analyzing");

    let mut input_buffer = DataBuffer::new(BUFFER_SECTORS * SECTOR_SIZE);
    // The analysis pass only cares about the index and the mask; its
    // encoded bytes are thrown away.
    let mut scratch = DataBuffer::new(BUFFER_SECTORS * SECTOR_SIZE);

    let mut processed: u32 = 0;
    while processed < sectors {
        let batch = (sectors - processed).min(BUFFER_SECTORS as u32);
        read_batch(&mut reader, &mut input_buffer, batch)?;

        scratch.reset();
        processor.encode_stream(
            &mut input_buffer,
            &mut scratch,
            &mut full_index,
            batch,
            IMAGE_START_SECTOR + processed,
            &mut options,
            true,
        )?;

        processed += batch;
        if let Some(bar) = &analysis_bar {
            bar.set_position(processed as u64);
        }
    }
    if let Some(bar) = &analysis_bar {
        bar.finish_and_clear();
    }
    debug!(
        "The best optimizations for this image are {:#04x}.",
        options.bits()
    );

    let entries = full_index.into_inner();
    let count_width = best_count_width(&entries)?;
    let packed = pack_index(&entries, count_width)?;
    let config = StreamConfig {
        optimizations: options.bits(),
        index_pack_mode: count_width,
        index_entries: (packed.len() / (1 + count_width as usize)) as u32,
        sectors,
    };
    info!(
        "Packed the index into {} records with a {}-byte run counter.",
        config.index_entries, count_width
    );

    let mut writer = BufWriter::new(create_output(&args.output)?);
    write_container_header(&mut writer, &config, &packed)?;

    info!("Encoding the image.");
    let emit_bar = progress_bar(sectors as u64, args.quiet, "Encoding");

    let mut batch_index: DataBuffer<SectorType> =
        DataBuffer::new(BUFFER_SECTORS);
    let mut output_buffer = DataBuffer::new(BUFFER_SECTORS * SECTOR_SIZE);
    let mut payload_bytes: u64 = 0;

    reader.seek(SeekFrom::Start(0))?;
    processed = 0;
    while processed < sectors {
        let batch = (sectors - processed).min(BUFFER_SECTORS as u32);
        read_batch(&mut reader, &mut input_buffer, batch)?;

        batch_index.reset();
        output_buffer.reset();
        processor.encode_stream(
            &mut input_buffer,
            &mut output_buffer,
            &mut batch_index,
            batch,
            IMAGE_START_SECTOR + processed,
            &mut options,
            false,
        )?;

        writer
            .write_all(&output_buffer.as_slice()[..output_buffer.position()])?;
        payload_bytes += output_buffer.position() as u64;

        processed += batch;
        if let Some(bar) = &emit_bar {
            bar.set_position(processed as u64);
        }
    }
    writer.flush()?;
    if let Some(bar) = &emit_bar {
        bar.finish_and_clear();
    }

    let container_size = (crate::storage_io::MAGIC_NUMBER.len()
        + StreamConfig::ENCODED_LEN
        + packed.len()) as u64
        + payload_bytes;
    info!(
        "Encoded {} bytes into {} ({:.1}% of the original) in {:.3}s.",
        input_size,
        container_size,
        container_size as f64 / input_size as f64 * 100.0,
        started.elapsed().as_secs_f64(),
    );

    Ok(())
}

/// Fills the buffer with the next `batch` sectors and rewinds it.
fn read_batch(
    reader: &mut impl Read,
    buffer: &mut DataBuffer<u8>,
    batch: u32,
) -> Result<(), CliError> {
    buffer.reset();
    let slot = buffer.consume_mut(batch as usize * SECTOR_SIZE)?;
    reader.read_exact(slot)?;
    buffer.reset();
    Ok(())
}
