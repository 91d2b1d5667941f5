use gl::types::{GLenum, GLuint};
use std::ffi::{c_char, CString, NulError};
use thiserror::Error;

/// Matches the fixed buffer the info log is read into.
const INFO_LOG_LEN: usize = 512;

#[derive(Copy, Clone, Debug, Eq, PartialEq)]
pub enum ShaderStage {
    Vertex,
    Fragment,
}

impl ShaderStage {
    fn gl_kind(self) -> GLenum {
        match self {
            ShaderStage::Vertex => gl::VERTEX_SHADER,
            ShaderStage::Fragment => gl::FRAGMENT_SHADER,
        }
    }

    pub fn name(self) -> &'static str {
        match self {
            ShaderStage::Vertex => "vertex",
            ShaderStage::Fragment => "fragment",
        }
    }
}

pub struct ProgramBuilder {
    vert: CString,
    frag: CString,
}

impl ProgramBuilder {
    pub fn new(vert_src: &str, frag_src: &str) -> Result<Self, ProgramError> {
        Ok(Self {
            vert: CString::new(vert_src)?,
            frag: CString::new(frag_src)?,
        })
    }

    /// Compiles both stages, links them and releases the stage objects.
    ///
    /// A stage that fails to compile is reported with its info log and is
    /// never retried. Requires a current GL context.
    pub fn build(self) -> Result<Program, ProgramError> {
        unsafe {
            let vert = compile_stage(ShaderStage::Vertex, &self.vert)?;
            let frag = compile_stage(ShaderStage::Fragment, &self.frag)?;

            let program = gl::CreateProgram();
            gl::AttachShader(program, vert);
            gl::AttachShader(program, frag);
            gl::LinkProgram(program);

            let mut success = 0;
            gl::GetProgramiv(program, gl::LINK_STATUS, (&mut success) as *mut i32);
            if success != 1 {
                let mut buf = [0_u8; INFO_LOG_LEN];

                gl::GetProgramInfoLog(
                    program,
                    INFO_LOG_LEN as i32,
                    std::ptr::null_mut(),
                    buf.as_mut_ptr() as *mut c_char,
                );

                return Err(ProgramError::Linking(info_log_to_string(&buf)));
            }

            gl::DeleteShader(vert);
            gl::DeleteShader(frag);

            Ok(Program { id: program })
        }
    }
}

unsafe fn compile_stage(stage: ShaderStage, src: &CString) -> Result<GLuint, ProgramError> {
    let shader = gl::CreateShader(stage.gl_kind());

    gl::ShaderSource(
        shader,
        1,
        (&src.as_ptr()) as *const *const c_char,
        std::ptr::null(),
    );

    gl::CompileShader(shader);

    let mut success = 0;
    gl::GetShaderiv(shader, gl::COMPILE_STATUS, (&mut success) as *mut i32);
    if success != 1 {
        let mut buf = [0_u8; INFO_LOG_LEN];

        gl::GetShaderInfoLog(
            shader,
            INFO_LOG_LEN as i32,
            std::ptr::null_mut(),
            buf.as_mut_ptr() as *mut c_char,
        );

        return Err(ProgramError::Compilation {
            stage,
            log: info_log_to_string(&buf),
        });
    }

    Ok(shader)
}

/// The driver NUL-terminates the log; everything past the first NUL is
/// uninitialized buffer space.
fn info_log_to_string(buf: &[u8]) -> String {
    let data = match buf.iter().position(|b| *b == 0) {
        Some(end) => &buf[..end],
        None => buf,
    };

    String::from_utf8_lossy(data).into_owned()
}

#[derive(Debug, Error)]
pub enum ProgramError {
    #[error("{} shader failed to compile: {log}", .stage.name())]
    Compilation { stage: ShaderStage, log: String },
    #[error("shader program failed to link: {0}")]
    Linking(String),
    #[error("shader source contains a NUL byte")]
    Source(#[from] NulError),
}

pub struct Program {
    id: GLuint,
}

impl Program {
    pub fn get_id(&self) -> GLuint {
        self.id
    }
}

impl Drop for Program {
    fn drop(&mut self) {
        unsafe { gl::DeleteProgram(self.id) }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn info_log_stops_at_first_nul() {
        let mut buf = [0_u8; INFO_LOG_LEN];
        buf[..12].copy_from_slice(b"0:1(9): err!");

        assert_eq!(info_log_to_string(&buf), "0:1(9): err!");
    }

    #[test]
    fn info_log_without_terminator_uses_whole_buffer() {
        let buf = [b'x'; INFO_LOG_LEN];

        assert_eq!(info_log_to_string(&buf).len(), INFO_LOG_LEN);
    }

    #[test]
    fn source_with_interior_nul_is_rejected() {
        let res = ProgramBuilder::new("void main() {\0}", "");

        assert!(matches!(res, Err(ProgramError::Source(_))));
    }
}
