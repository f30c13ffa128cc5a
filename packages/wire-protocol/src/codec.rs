//! Field readers and writers over async byte streams.
//!
//! The reader enforces a size limit on every field body before allocating
//! for it, so a forged length prefix can not make a node allocate more than
//! the limit.
use tokio::io::{AsyncRead, AsyncReadExt, AsyncWrite, AsyncWriteExt};

use crate::error::DecodeError;
use crate::field::{Field, FieldType};
use crate::DEFAULT_MAX_FIELD_SIZE;

/// Reads typed fields from a stream.
pub struct FieldReader<R> {
    inner: R,
    max_field_size: usize,
}

impl<R: AsyncRead + Unpin> FieldReader<R> {
    #[must_use]
    pub fn new(inner: R) -> Self {
        Self::with_max_field_size(inner, DEFAULT_MAX_FIELD_SIZE)
    }

    #[must_use]
    pub fn with_max_field_size(inner: R, max_field_size: usize) -> Self {
        Self { inner, max_field_size }
    }

    /// Reads the next field.
    ///
    /// # Errors
    ///
    /// Will return [`DecodeError::ConnectionClosed`] if the stream ends
    /// before a new field starts, and any other [`DecodeError`] if the field
    /// is malformed, too large, or cut short.
    pub async fn read_field(&mut self) -> Result<Field, DecodeError> {
        let tag = match self.inner.read_u8().await {
            Ok(tag) => tag,
            Err(err) if err.kind() == std::io::ErrorKind::UnexpectedEof => return Err(DecodeError::ConnectionClosed),
            Err(err) => return Err(err.into()),
        };

        let field_type = FieldType::from_tag(tag).ok_or(DecodeError::UnknownFieldType { tag })?;

        let field = match field_type {
            FieldType::String => Field::String(self.read_utf8().await?),
            FieldType::Integer => Field::Integer(self.inner.read_u64().await?),
            FieldType::Bytes => {
                let len = self.read_len(1).await?;
                let mut bytes = vec![0u8; len];
                self.inner.read_exact(&mut bytes).await?;
                Field::Bytes(bytes)
            }
            FieldType::IntegerList => {
                let count = self.read_len(8).await?;
                let mut values = Vec::with_capacity(count);
                for _ in 0..count {
                    values.push(self.inner.read_u64().await?);
                }
                Field::IntegerList(values)
            }
            FieldType::StringList => {
                let count = self.read_len(4).await?;
                let mut values = Vec::with_capacity(count);
                let mut total = 0usize;
                for _ in 0..count {
                    let value = self.read_utf8().await?;
                    total = total.saturating_add(value.len());
                    if total > self.max_field_size {
                        return Err(DecodeError::FieldTooLarge {
                            len: total,
                            max: self.max_field_size,
                        });
                    }
                    values.push(value);
                }
                Field::StringList(values)
            }
        };

        Ok(field)
    }

    /// # Errors
    ///
    /// Will return [`DecodeError::UnexpectedField`] if the next field is not a
    /// string.
    pub async fn read_string(&mut self) -> Result<String, DecodeError> {
        match self.read_field().await? {
            Field::String(value) => Ok(value),
            other => Err(unexpected(FieldType::String, &other)),
        }
    }

    /// # Errors
    ///
    /// Will return [`DecodeError::UnexpectedField`] if the next field is not
    /// an integer.
    pub async fn read_integer(&mut self) -> Result<u64, DecodeError> {
        match self.read_field().await? {
            Field::Integer(value) => Ok(value),
            other => Err(unexpected(FieldType::Integer, &other)),
        }
    }

    /// # Errors
    ///
    /// Will return [`DecodeError::UnexpectedField`] if the next field is not a
    /// byte buffer.
    pub async fn read_bytes(&mut self) -> Result<Vec<u8>, DecodeError> {
        match self.read_field().await? {
            Field::Bytes(value) => Ok(value),
            other => Err(unexpected(FieldType::Bytes, &other)),
        }
    }

    /// # Errors
    ///
    /// Will return [`DecodeError::UnexpectedField`] if the next field is not
    /// an integer list.
    pub async fn read_integer_list(&mut self) -> Result<Vec<u64>, DecodeError> {
        match self.read_field().await? {
            Field::IntegerList(values) => Ok(values),
            other => Err(unexpected(FieldType::IntegerList, &other)),
        }
    }

    /// # Errors
    ///
    /// Will return [`DecodeError::UnexpectedField`] if the next field is not a
    /// string list.
    pub async fn read_string_list(&mut self) -> Result<Vec<String>, DecodeError> {
        match self.read_field().await? {
            Field::StringList(values) => Ok(values),
            other => Err(unexpected(FieldType::StringList, &other)),
        }
    }

    async fn read_utf8(&mut self) -> Result<String, DecodeError> {
        let len = self.read_len(1).await?;
        let mut bytes = vec![0u8; len];
        self.inner.read_exact(&mut bytes).await?;
        String::from_utf8(bytes).map_err(|_| DecodeError::InvalidUtf8)
    }

    /// Reads a `u32` prefix and checks that `prefix * element_size` bytes fit
    /// in the field size limit.
    async fn read_len(&mut self, element_size: usize) -> Result<usize, DecodeError> {
        let prefix = self.inner.read_u32().await?;
        let len = usize::try_from(prefix).unwrap_or(usize::MAX);

        let bytes = len.saturating_mul(element_size);
        if bytes > self.max_field_size {
            return Err(DecodeError::FieldTooLarge {
                len: bytes,
                max: self.max_field_size,
            });
        }

        Ok(len)
    }
}

fn unexpected(expected: FieldType, found: &Field) -> DecodeError {
    DecodeError::UnexpectedField {
        expected,
        found: found.field_type(),
    }
}

/// Writes typed fields to a stream.
///
/// Fields are encoded in memory and written with a single `write_all` each.
/// Callers must [`flush`](FieldWriter::flush) once the whole message has been
/// written.
pub struct FieldWriter<W> {
    inner: W,
    buffer: Vec<u8>,
}

impl<W: AsyncWrite + Unpin> FieldWriter<W> {
    #[must_use]
    pub fn new(inner: W) -> Self {
        Self {
            inner,
            buffer: Vec::new(),
        }
    }

    /// # Errors
    ///
    /// Will return an error if the field can not be encoded or written.
    pub async fn write_field(&mut self, field: &Field) -> Result<(), std::io::Error> {
        self.buffer.clear();
        field.encode(&mut self.buffer)?;
        self.inner.write_all(&self.buffer).await
    }

    /// # Errors
    ///
    /// Will return an error if the field can not be written.
    pub async fn write_string(&mut self, value: &str) -> Result<(), std::io::Error> {
        self.write_field(&Field::String(value.to_string())).await
    }

    /// # Errors
    ///
    /// Will return an error if the field can not be written.
    pub async fn write_integer(&mut self, value: u64) -> Result<(), std::io::Error> {
        self.write_field(&Field::Integer(value)).await
    }

    /// # Errors
    ///
    /// Will return an error if the field can not be written.
    pub async fn write_bytes(&mut self, value: Vec<u8>) -> Result<(), std::io::Error> {
        self.write_field(&Field::Bytes(value)).await
    }

    /// # Errors
    ///
    /// Will return an error if the field can not be written.
    pub async fn write_integer_list(&mut self, values: Vec<u64>) -> Result<(), std::io::Error> {
        self.write_field(&Field::IntegerList(values)).await
    }

    /// # Errors
    ///
    /// Will return an error if the field can not be written.
    pub async fn write_string_list(&mut self, values: Vec<String>) -> Result<(), std::io::Error> {
        self.write_field(&Field::StringList(values)).await
    }

    /// # Errors
    ///
    /// Will return an error if the stream can not be flushed.
    pub async fn flush(&mut self) -> Result<(), std::io::Error> {
        self.inner.flush().await
    }
}
