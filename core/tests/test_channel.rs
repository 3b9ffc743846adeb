// Channel-mode behaviour: short reads, sink failures, parity with buffer mode.

#[cfg(test)]
mod tests {
    use std::io::{self, Cursor, Read, Write};

    use pstream_core::prelude::*;
    use pstream_core::stream::{FileReader, FileWriter};

    /// Hands out at most `step` bytes per call and interrupts every other call.
    struct TrickleReader {
        data: Vec<u8>,
        pos: usize,
        step: usize,
        calls: usize,
    }

    impl TrickleReader {
        fn new(data: Vec<u8>, step: usize) -> Self {
            Self { data, pos: 0, step, calls: 0 }
        }
    }

    impl Read for TrickleReader {
        fn read(&mut self, buf: &mut [u8]) -> io::Result<usize> {
            self.calls += 1;
            if self.calls % 2 == 0 {
                return Err(io::Error::new(io::ErrorKind::Interrupted, "again"));
            }
            let n = self.step.min(buf.len()).min(self.data.len() - self.pos);
            buf[..n].copy_from_slice(&self.data[self.pos..self.pos + n]);
            self.pos += n;
            Ok(n)
        }
    }

    /// Accepts `budget` bytes, one at a time, then refuses.
    struct StingyWriter {
        out: Vec<u8>,
        budget: usize,
    }

    impl Write for StingyWriter {
        fn write(&mut self, buf: &[u8]) -> io::Result<usize> {
            if self.budget == 0 || buf.is_empty() {
                return Ok(0);
            }
            self.budget -= 1;
            self.out.push(buf[0]);
            Ok(1)
        }

        fn flush(&mut self) -> io::Result<()> {
            Ok(())
        }
    }

    struct BrokenWriter;

    impl Write for BrokenWriter {
        fn write(&mut self, _: &[u8]) -> io::Result<usize> {
            Err(io::Error::new(io::ErrorKind::BrokenPipe, "closed"))
        }

        fn flush(&mut self) -> io::Result<()> {
            Ok(())
        }
    }

    fn write_sample<S: Stream + ?Sized>(s: &mut S) -> pstream_core::types::Result<()> {
        s.write_u8(0xFE)?;
        s.write_i16(-300)?;
        s.write_u32_with(0xCAFEBABE, Endian::Big)?;
        s.write_f64(6.9)?;
        s.write_string("hi")?;
        s.write_string64("longer text")?;
        s.write_cstring("ab", 5)?;
        s.write_cstring_unsized("tail")?;
        s.write_hex("0d0a")?;
        Ok(())
    }

// ## 1️⃣ Short reads and interrupts

    #[test]
    fn reads_survive_trickling_source() {
        let mut buf = BufferStream::new();
        write_sample(&mut buf).unwrap();
        let bytes = buf.into_vec();

        let mut s = ChannelStream::reader(TrickleReader::new(bytes, 1));
        assert_eq!(s.read_u8().unwrap(), 0xFE);
        assert_eq!(s.read_i16().unwrap(), -300);
        assert_eq!(s.read_u32_with(Endian::Big).unwrap(), 0xCAFEBABE);
        assert_eq!(s.read_f64().unwrap(), 6.9);
        assert_eq!(s.read_string().unwrap(), "hi");
        assert_eq!(s.read_string64().unwrap(), "longer text");
        assert_eq!(s.read_cstring(5).unwrap(), "ab");
        assert_eq!(s.read_cstring_unsized().unwrap(), "tail");
        assert_eq!(s.read_bytes(2).unwrap(), vec![0x0D, 0x0A]);
        assert!(s.counters().short_reads > 0);
        assert!(s.read_u8().unwrap_err().is_eof());
    }

    #[test]
    fn exhaustion_mid_value_is_source_failure() {
        let mut s = ChannelStream::reader(TrickleReader::new(vec![1, 2, 3], 2));
        let err = s.read_u64().unwrap_err();
        assert!(matches!(err, StreamError::SourceFailure(_)));
        assert_eq!(s.counters().read_failures, 1);
    }

// ## 2️⃣ Sink failures

    #[test]
    fn partial_sink_reports_failure() {
        let mut s = ChannelStream::writer(StingyWriter { out: Vec::new(), budget: 3 });
        s.write_u16(7).unwrap();
        let err = s.write_u32(9).unwrap_err();
        assert!(matches!(err, StreamError::SinkFailure(_)));
        assert_eq!(s.counters().write_failures, 1);

        let (_, w) = s.into_inner();
        assert_eq!(w.unwrap().out, vec![7, 0, 9]);
    }

    #[test]
    fn broken_sink_reports_failure() {
        let mut s = ChannelStream::writer(BrokenWriter);
        assert!(matches!(s.write_string("x"), Err(StreamError::SinkFailure(_))));
    }

// ## 3️⃣ Parity with buffer mode

    #[test]
    fn channel_and_buffer_encode_identically() -> anyhow::Result<()> {
        let mut buf = BufferStream::new();
        write_sample(&mut buf)?;

        let mut chan = ChannelStream::writer(Vec::new());
        write_sample(&mut chan)?;
        chan.flush()?;

        let (_, written) = chan.into_inner();
        assert_eq!(written.unwrap(), buf.get_data());
        Ok(())
    }

    #[test]
    fn big_endian_channel_default() -> anyhow::Result<()> {
        let opts = StreamOptions::default().with_endian(Endian::Big);
        let mut s = ChannelStream::writer_with_options(Vec::new(), &opts);
        s.write_u32(0x01020304)?;
        s.write_string("ok")?;
        let (_, w) = s.into_inner();
        assert_eq!(w.unwrap(), vec![1, 2, 3, 4, 0, 2, b'o', b'k']);
        Ok(())
    }

// ## 4️⃣ Payload limits

    #[test]
    fn bogus_string64_prefix_hits_limit() {
        let mut s = ChannelStream::reader(Cursor::new(u64::MAX.to_le_bytes().to_vec()));
        let err = s.read_string64().unwrap_err();
        assert!(matches!(err, StreamError::LengthLimit { len: u64::MAX, .. }));
    }

    #[test]
    fn configured_limit_applies_to_strings() {
        let opts = StreamOptions::default().with_max_payload_len(4);

        let mut ok = BufferStream::new();
        ok.write_string("four").unwrap();
        let mut s = ChannelStream::reader_with_options(Cursor::new(ok.into_vec()), &opts);
        assert_eq!(s.read_string().unwrap(), "four");

        let mut big = BufferStream::new();
        big.write_string("five!").unwrap();
        let mut s = ChannelStream::reader_with_options(Cursor::new(big.into_vec()), &opts);
        assert!(matches!(s.read_string(), Err(StreamError::LengthLimit { len: 5, max: 4 })));
    }

    #[test]
    fn unterminated_unsized_cstring_hits_limit() {
        let opts = StreamOptions::default().with_max_payload_len(8);
        let mut s = ChannelStream::reader_with_options(Cursor::new(vec![b'a'; 32]), &opts);
        assert!(matches!(s.read_cstring_unsized(), Err(StreamError::LengthLimit { max: 8, .. })));
    }

    #[test]
    fn element_run_respects_limit() {
        let opts = StreamOptions::default().with_max_payload_len(8);
        let mut s = ChannelStream::reader_with_options(Cursor::new(vec![0u8; 64]), &opts);
        assert_eq!(s.read_vec::<u32>(2).unwrap(), vec![0, 0]);
        assert!(matches!(s.read_vec::<u32>(3), Err(StreamError::LengthLimit { len: 12, max: 8 })));
    }

    #[test]
    fn element_runs_survive_trickling_source() {
        let mut buf = BufferStream::new();
        buf.write_slice(&[1u32, 2, 3]).unwrap();
        buf.write_slice(&[-4i16, 5]).unwrap();

        let mut s = ChannelStream::reader(TrickleReader::new(buf.into_vec(), 1));
        let arr: [u32; 3] = s.read_array().unwrap();
        assert_eq!(arr, [1, 2, 3]);
        let mut rest = [0i16; 2];
        s.fill_slice(&mut rest).unwrap();
        assert_eq!(rest, [-4, 5]);
    }

// ## 5️⃣ Files and boxed endpoints

    #[test]
    fn file_endpoints_round_trip() -> anyhow::Result<()> {
        let path = std::env::temp_dir().join(format!("pstream-core-{}.bin", std::process::id()));

        let mut w = FileWriter::create(&path, &StreamOptions::default())?;
        write_sample(&mut w)?;
        w.flush()?;
        drop(w);

        let mut r = FileReader::open(&path, &StreamOptions::default())?;
        assert_eq!(r.read_u8()?, 0xFE);
        assert_eq!(r.read_i16()?, -300);
        assert!(r.write_u8(0).is_err());

        std::fs::remove_file(&path)?;
        Ok(())
    }

    #[test]
    fn boxed_reader_endpoint() -> anyhow::Result<()> {
        let src: Box<dyn Read> = Box::new(Cursor::new(vec![9u8, 0, 0, 0]));
        let mut s = ChannelStream::reader(src);
        assert_eq!(s.read_u32()?, 9);
        Ok(())
    }
}
