use crate::{
    metadata::{
        signatures::{
            signature_kind, CallingConventionFlags, CALLING_CONVENTION, ELEMENT_TYPE,
        },
        token::Token,
    },
    utils::{write_compressed_int, write_compressed_token, write_compressed_uint},
    Error, Parser, Result,
};

/// Maps a token of the image a signature was read from to a token of the image it is written to
///
/// Any `FnMut(Token) -> Result<Token>` closure is a translator.
pub trait TokenTranslator {
    /// Translate one embedded `TypeDefOrRef` token
    ///
    /// # Errors
    /// Whatever the translation fails with aborts the signature walk.
    fn translate(&mut self, token: Token) -> Result<Token>;
}

impl<F> TokenTranslator for F
where
    F: FnMut(Token) -> Result<Token>,
{
    fn translate(&mut self, token: Token) -> Result<Token> {
        self(token)
    }
}

/// Rewrite a signature blob, replacing every embedded token through `translator`
///
/// The first byte selects the signature kind: field, local variables, property, method
/// instantiation or any method signature.
///
/// # Errors
/// Returns [`crate::Error::CorruptMetadata`] on grammar violations and truncated blobs,
/// [`crate::Error::RecursionLimit`] when nesting exceeds `max_depth`, or the translator's error.
pub fn import_signature(
    blob: &[u8],
    translator: &mut dyn TokenTranslator,
    max_depth: usize,
) -> Result<Vec<u8>> {
    let mut importer = SignatureImporter::new(blob, translator, max_depth)?;
    truncated_is_corrupt(importer.signature())?;
    importer.finish()
}

/// Rewrite a `TypeSpec` blob, which holds exactly one type
///
/// # Errors
/// Same conditions as [`import_signature`].
pub fn import_type_spec_blob(
    blob: &[u8],
    translator: &mut dyn TokenTranslator,
    max_depth: usize,
) -> Result<Vec<u8>> {
    let mut importer = SignatureImporter::new(blob, translator, max_depth)?;
    truncated_is_corrupt(importer.type_sig())?;
    importer.finish()
}

fn truncated_is_corrupt(result: Result<()>) -> Result<()> {
    match result {
        Err(Error::OutOfBounds) => Err(corrupt_error!("signature ends prematurely")),
        other => other,
    }
}

/// Recursive descent walker that copies a signature while translating its tokens
///
/// Compressed values are decoded and re-encoded, so the output length is only known once the
/// walk is done.
pub(crate) struct SignatureImporter<'a, 't> {
    input: Parser<'a>,
    output: Vec<u8>,
    translator: &'t mut dyn TokenTranslator,
    depth: usize,
    max_depth: usize,
}

impl<'a, 't> SignatureImporter<'a, 't> {
    pub(crate) fn new(
        data: &'a [u8],
        translator: &'t mut dyn TokenTranslator,
        max_depth: usize,
    ) -> Result<Self> {
        let mut output = Vec::new();
        output.try_reserve(data.len())?;

        Ok(SignatureImporter {
            input: Parser::new(data),
            output,
            translator,
            depth: 0,
            max_depth,
        })
    }

    pub(crate) fn pos(&self) -> usize {
        self.input.pos()
    }

    pub(crate) fn peek(&self) -> Result<u8> {
        self.input.peek_byte()
    }

    pub(crate) fn seek(&mut self, pos: usize) -> Result<()> {
        self.input.seek(pos)
    }

    fn finish(self) -> Result<Vec<u8>> {
        if self.input.has_more_data() {
            return Err(corrupt_error!(
                "{} trailing bytes after signature",
                self.input.remaining()
            ));
        }
        Ok(self.output)
    }

    fn enter(&mut self) -> Result<()> {
        self.depth += 1;
        if self.depth > self.max_depth {
            return Err(Error::RecursionLimit(self.max_depth));
        }
        Ok(())
    }

    fn leave(&mut self) {
        self.depth -= 1;
    }

    fn copy_u8(&mut self) -> Result<u8> {
        let value = self.input.read_u8()?;
        self.output.push(value);
        Ok(value)
    }

    fn copy_uint(&mut self) -> Result<u32> {
        let value = self.input.read_compressed_uint()?;
        write_compressed_uint(value, &mut self.output)?;
        Ok(value)
    }

    fn copy_int(&mut self) -> Result<()> {
        let value = self.input.read_compressed_int()?;
        write_compressed_int(value, &mut self.output)
    }

    fn copy_token(&mut self) -> Result<()> {
        let token = self.input.read_compressed_token()?;
        let translated = self.translator.translate(token)?;
        write_compressed_token(translated, &mut self.output)
    }

    /// Walk a complete signature, dispatching on its header byte
    pub(crate) fn signature(&mut self) -> Result<()> {
        let header = self.input.peek_byte()?;
        match signature_kind(header) {
            CALLING_CONVENTION::FIELD => {
                self.copy_u8()?;
                self.type_sig()
            }
            CALLING_CONVENTION::LOCAL_SIG | CALLING_CONVENTION::GENERICINST => {
                self.copy_u8()?;
                let count = self.copy_uint()?;
                for _ in 0..count {
                    self.type_sig()?;
                }
                Ok(())
            }
            CALLING_CONVENTION::PROPERTY => {
                self.copy_u8()?;
                let count = self.copy_uint()?;
                self.type_sig()?;
                for _ in 0..count {
                    self.type_sig()?;
                }
                Ok(())
            }
            _ => self.method_sig(),
        }
    }

    /// Walk a `MethodDefSig`, `MethodRefSig` or `StandAloneMethodSig`
    fn method_sig(&mut self) -> Result<()> {
        self.enter()?;

        let header = self.copy_u8()?;
        if CallingConventionFlags::from_header(header).contains(CallingConventionFlags::GENERIC) {
            self.copy_uint()?;
        }

        let param_count = self.copy_uint()?;
        self.type_sig()?;

        let mut seen_sentinel = false;
        for _ in 0..param_count {
            if self.input.peek_byte()? == ELEMENT_TYPE::SENTINEL {
                if seen_sentinel {
                    return Err(corrupt_error!("second SENTINEL in parameter list"));
                }
                seen_sentinel = true;
                self.copy_u8()?;
            }
            self.type_sig()?;
        }

        self.leave();
        Ok(())
    }

    /// Walk a single type
    pub(crate) fn type_sig(&mut self) -> Result<()> {
        self.enter()?;

        let element = self.copy_u8()?;
        match element {
            ELEMENT_TYPE::VOID..=ELEMENT_TYPE::STRING
            | ELEMENT_TYPE::TYPEDBYREF
            | ELEMENT_TYPE::I
            | ELEMENT_TYPE::U
            | ELEMENT_TYPE::OBJECT => {}
            ELEMENT_TYPE::PTR
            | ELEMENT_TYPE::BYREF
            | ELEMENT_TYPE::SZARRAY
            | ELEMENT_TYPE::PINNED => self.type_sig()?,
            ELEMENT_TYPE::CMOD_REQD | ELEMENT_TYPE::CMOD_OPT => {
                self.copy_token()?;
                self.type_sig()?;
            }
            ELEMENT_TYPE::VALUETYPE | ELEMENT_TYPE::CLASS => self.copy_token()?,
            ELEMENT_TYPE::VAR | ELEMENT_TYPE::MVAR => {
                self.copy_uint()?;
            }
            ELEMENT_TYPE::ARRAY => {
                self.type_sig()?;
                // rank
                self.copy_uint()?;

                let sizes = self.copy_uint()?;
                for _ in 0..sizes {
                    self.copy_uint()?;
                }

                let lower_bounds = self.copy_uint()?;
                for _ in 0..lower_bounds {
                    self.copy_int()?;
                }
            }
            ELEMENT_TYPE::GENERICINST => {
                let next = self.input.peek_byte()?;
                if next != ELEMENT_TYPE::CLASS && next != ELEMENT_TYPE::VALUETYPE {
                    return Err(corrupt_error!(
                        "GENERICINST - Next byte is not TYPE_CLASS or TYPE_VALUE - {}",
                        next
                    ));
                }

                self.type_sig()?;
                let arg_count = self.copy_uint()?;
                for _ in 0..arg_count {
                    self.type_sig()?;
                }
            }
            ELEMENT_TYPE::FNPTR => self.method_sig()?,
            _ => {
                return Err(corrupt_error!(
                    "Unsupported ELEMENT_TYPE - 0x{:02x} at offset {}",
                    element,
                    self.input.pos() - 1
                ))
            }
        }

        self.leave();
        Ok(())
    }
}
