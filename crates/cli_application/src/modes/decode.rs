//! The decode mode: encoded container in, byte-exact disc image out.

use std::io::{BufReader, BufWriter, Read, Write};
use std::time::Instant;

use ecm2::{
    encoded_sector_size, unpack_index, DataBuffer, Ecm2Error, Ecm2Processor,
    Optimizations, IMAGE_START_SECTOR, SECTOR_SIZE,
};
use tracing::{debug, info};

use crate::arg_handling::Args;
use crate::error_handling::CliError;
use crate::modes::{progress_bar, BUFFER_SECTORS};
use crate::storage_io::{create_output, open_input, read_container_header};

pub fn run_decode(args: &Args) -> Result<(), CliError> {
    let started = Instant::now();

    let (input_file, _) = open_input(&args.input)?;
    let mut reader = BufReader::new(input_file);

    debug!("Checking that the input file is an encoded image.");
    let config = read_container_header(&mut reader)?;
    debug!(
        "Optimizations: {:#04x}, sectors: {}, index pack mode: {}.",
        config.optimizations, config.sectors, config.index_pack_mode,
    );

    let packed_len =
        config.index_entries as usize * (1 + config.index_pack_mode as usize);
    let mut packed = vec![0u8; packed_len];
    reader.read_exact(&mut packed)?;

    let entries = unpack_index(&packed, config.index_pack_mode)?;
    if entries.is_empty() || entries.len() != config.sectors as usize {
        // The expanded index must cover the declared image exactly.
        return Err(CliError::Codec(Ecm2Error::WrongIndexData));
    }

    let options = Optimizations::from_bits_retain(config.optimizations);
    let processor = Ecm2Processor::new();
    let mut writer = BufWriter::new(create_output(&args.output)?);

    info!("Rebuilding {} sectors.", config.sectors);
    let bar = progress_bar(config.sectors as u64, args.quiet, "Decoding");

    let mut index = DataBuffer::from_vec(entries);
    let mut input_buffer = DataBuffer::new(BUFFER_SECTORS * SECTOR_SIZE);
    let mut output_buffer = DataBuffer::new(BUFFER_SECTORS * SECTOR_SIZE);

    let mut processed: u32 = 0;
    while processed < config.sectors {
        let batch = (config.sectors - processed).min(BUFFER_SECTORS as u32);

        // Each sector type dictates how many encoded bytes it occupies.
        let bytes_to_read: usize = index.as_slice()
            [processed as usize..(processed + batch) as usize]
            .iter()
            .map(|sector_type| encoded_sector_size(*sector_type, options))
            .sum();

        input_buffer.reset();
        let slot = input_buffer.consume_mut(bytes_to_read)?;
        reader.read_exact(slot)?;
        input_buffer.reset();

        output_buffer.reset();
        processor.decode_stream(
            &mut input_buffer,
            &mut output_buffer,
            &mut index,
            batch,
            IMAGE_START_SECTOR + processed,
            options,
        )?;

        writer
            .write_all(&output_buffer.as_slice()[..output_buffer.position()])?;

        processed += batch;
        if let Some(bar) = &bar {
            bar.set_position(processed as u64);
        }
    }
    writer.flush()?;
    if let Some(bar) = &bar {
        bar.finish_and_clear();
    }

    info!(
        "Rebuilt {} sectors ({} bytes) in {:.3}s.",
        config.sectors,
        config.sectors as u64 * SECTOR_SIZE as u64,
        started.elapsed().as_secs_f64(),
    );

    Ok(())
}
