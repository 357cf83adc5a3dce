use super::scene::{DrawList, Figure, Vertex};
use anyhow::{anyhow, Result};
use glfw::{Action, Context, GlfwReceiver, Key, WindowEvent};
use std::ffi::CString;

/// Events that can be emitted by the plot window
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum DisplayEvent {
    NextFigure,
    Quit,
}

/// OpenGL window showing one figure at a time
pub struct PlotWindow {
    glfw: glfw::Glfw,
    window: glfw::PWindow,
    events: GlfwReceiver<(f64, WindowEvent)>,
    figures: Vec<Figure>,
    draw_lists: Vec<DrawList>,
    current: usize,
    shader_program: u32,
    vao: u32,
    vbo: u32,
}

impl PlotWindow {
    /// Create a window for `figures`; Tab cycles through them
    pub fn new(figures: Vec<Figure>, width: u32, height: u32) -> Result<Self> {
        if figures.is_empty() {
            return Err(anyhow!("No figures to display"));
        }

        let mut glfw = glfw::init(glfw::fail_on_errors)
            .map_err(|e| anyhow!("Failed to initialize GLFW: {:?}", e))?;

        // Request OpenGL 3.3 Core Profile
        glfw.window_hint(glfw::WindowHint::ContextVersion(3, 3));
        glfw.window_hint(glfw::WindowHint::OpenGlProfile(
            glfw::OpenGlProfileHint::Core,
        ));
        glfw.window_hint(glfw::WindowHint::OpenGlForwardCompat(true));

        let (mut window, events) = glfw
            .create_window(width, height, &figures[0].title, glfw::WindowMode::Windowed)
            .ok_or_else(|| anyhow!("Failed to create GLFW window"))?;

        window.make_current();
        window.set_key_polling(true);
        window.set_framebuffer_size_polling(true);
        glfw.set_swap_interval(glfw::SwapInterval::Sync(1));

        // Load OpenGL function pointers
        gl::load_with(|symbol| window.get_proc_address(symbol) as *const _);

        let shader_program = unsafe { create_shader_program()? };
        let (vao, vbo) = unsafe { create_buffers() };

        // Geometry only depends on the figure, tessellate once
        let draw_lists = figures.iter().map(Figure::tessellate).collect();

        log::info!("Opened {}x{} plot window with {} figure(s)", width, height, figures.len());

        Ok(Self {
            glfw,
            window,
            events,
            figures,
            draw_lists,
            current: 0,
            shader_program,
            vao,
            vbo,
        })
    }

    /// Check if the window should close
    pub fn should_close(&self) -> bool {
        self.window.should_close()
    }

    /// Figure currently on screen
    pub fn current_figure(&self) -> &Figure {
        &self.figures[self.current]
    }

    /// Process events and render the current figure, returns list of events
    pub fn update(&mut self) -> Vec<DisplayEvent> {
        let mut display_events = Vec::new();

        self.glfw.poll_events();
        for (_, event) in glfw::flush_messages(&self.events) {
            match event {
                WindowEvent::Key(Key::Escape, _, Action::Press, _) => {
                    self.window.set_should_close(true);
                    display_events.push(DisplayEvent::Quit);
                }
                WindowEvent::Key(Key::Tab, _, Action::Press, _) => {
                    display_events.push(DisplayEvent::NextFigure);
                }
                WindowEvent::FramebufferSize(width, height) => {
                    unsafe {
                        gl::Viewport(0, 0, width, height);
                    }
                }
                _ => {}
            }
        }

        if display_events.contains(&DisplayEvent::NextFigure) {
            self.current = (self.current + 1) % self.figures.len();
            let title = self.current_figure().title.clone();
            self.window.set_title(&title);
            log::info!("Showing figure: {}", title);
        }

        self.render();
        self.window.swap_buffers();

        display_events
    }

    /// Block until the window is closed
    pub fn run(&mut self) {
        while !self.should_close() {
            self.update();
        }
    }

    fn render(&self) {
        let list = &self.draw_lists[self.current];

        unsafe {
            gl::ClearColor(0.1, 0.1, 0.15, 1.0);
            gl::Clear(gl::COLOR_BUFFER_BIT);

            gl::UseProgram(self.shader_program);
            gl::BindVertexArray(self.vao);
            gl::BindBuffer(gl::ARRAY_BUFFER, self.vbo);

            upload(&list.triangles);
            gl::DrawArrays(gl::TRIANGLES, 0, list.triangles.len() as i32);

            upload(&list.lines);
            gl::LineWidth(1.0);
            gl::DrawArrays(gl::LINES, 0, list.lines.len() as i32);

            // All strips share one buffer, drawn by offset
            let strips: Vec<Vertex> = list.strips.iter().flatten().copied().collect();
            upload(&strips);
            gl::LineWidth(1.5);
            let mut first = 0;
            for strip in &list.strips {
                gl::DrawArrays(gl::LINE_STRIP, first, strip.len() as i32);
                first += strip.len() as i32;
            }

            gl::BindVertexArray(0);
        }
    }
}

impl Drop for PlotWindow {
    fn drop(&mut self) {
        unsafe {
            gl::DeleteProgram(self.shader_program);
            gl::DeleteBuffers(1, &self.vbo);
            gl::DeleteVertexArrays(1, &self.vao);
        }
    }
}

/// Replace the bound VBO contents with `vertices`
unsafe fn upload(vertices: &[Vertex]) {
    gl::BufferData(
        gl::ARRAY_BUFFER,
        std::mem::size_of_val(vertices) as isize,
        vertices.as_ptr() as *const _,
        gl::DYNAMIC_DRAW,
    );
}

/// Create shader program
unsafe fn create_shader_program() -> Result<u32> {
    let vertex_shader_source = CString::new(
        r#"
        #version 330 core
        layout (location = 0) in vec2 aPos;
        layout (location = 1) in vec3 aColor;
        out vec3 vColor;

        void main() {
            gl_Position = vec4(aPos.x, aPos.y, 0.0, 1.0);
            vColor = aColor;
        }
        "#,
    )?;

    let fragment_shader_source = CString::new(
        r#"
        #version 330 core
        in vec3 vColor;
        out vec4 FragColor;

        void main() {
            FragColor = vec4(vColor, 1.0);
        }
        "#,
    )?;

    let vertex_shader = gl::CreateShader(gl::VERTEX_SHADER);
    gl::ShaderSource(
        vertex_shader,
        1,
        &vertex_shader_source.as_ptr(),
        std::ptr::null(),
    );
    gl::CompileShader(vertex_shader);
    check_shader_compile_errors(vertex_shader, "VERTEX")?;

    let fragment_shader = gl::CreateShader(gl::FRAGMENT_SHADER);
    gl::ShaderSource(
        fragment_shader,
        1,
        &fragment_shader_source.as_ptr(),
        std::ptr::null(),
    );
    gl::CompileShader(fragment_shader);
    check_shader_compile_errors(fragment_shader, "FRAGMENT")?;

    let shader_program = gl::CreateProgram();
    gl::AttachShader(shader_program, vertex_shader);
    gl::AttachShader(shader_program, fragment_shader);
    gl::LinkProgram(shader_program);
    check_program_link_errors(shader_program)?;

    // Delete shaders (they're linked into the program now)
    gl::DeleteShader(vertex_shader);
    gl::DeleteShader(fragment_shader);

    Ok(shader_program)
}

/// Create VAO and VBO with the x, y, r, g, b vertex layout
unsafe fn create_buffers() -> (u32, u32) {
    let mut vao = 0;
    let mut vbo = 0;

    gl::GenVertexArrays(1, &mut vao);
    gl::GenBuffers(1, &mut vbo);

    gl::BindVertexArray(vao);
    gl::BindBuffer(gl::ARRAY_BUFFER, vbo);

    let stride = std::mem::size_of::<Vertex>() as i32;
    gl::VertexAttribPointer(0, 2, gl::FLOAT, gl::FALSE, stride, std::ptr::null());
    gl::EnableVertexAttribArray(0);
    gl::VertexAttribPointer(
        1,
        3,
        gl::FLOAT,
        gl::FALSE,
        stride,
        (2 * std::mem::size_of::<f32>()) as *const _,
    );
    gl::EnableVertexAttribArray(1);

    gl::BindBuffer(gl::ARRAY_BUFFER, 0);
    gl::BindVertexArray(0);

    (vao, vbo)
}

/// Check shader compilation errors
unsafe fn check_shader_compile_errors(shader: u32, shader_type: &str) -> Result<()> {
    let mut success = 0;
    gl::GetShaderiv(shader, gl::COMPILE_STATUS, &mut success);

    if success == 0 {
        let mut log_length = 0;
        gl::GetShaderiv(shader, gl::INFO_LOG_LENGTH, &mut log_length);

        let mut log = vec![0u8; log_length.max(1) as usize];
        gl::GetShaderInfoLog(
            shader,
            log_length,
            std::ptr::null_mut(),
            log.as_mut_ptr() as *mut gl::types::GLchar,
        );

        return Err(anyhow!(
            "Shader compilation error ({}): {}",
            shader_type,
            String::from_utf8_lossy(&log)
        ));
    }

    Ok(())
}

/// Check program linking errors
unsafe fn check_program_link_errors(program: u32) -> Result<()> {
    let mut success = 0;
    gl::GetProgramiv(program, gl::LINK_STATUS, &mut success);

    if success == 0 {
        let mut log_length = 0;
        gl::GetProgramiv(program, gl::INFO_LOG_LENGTH, &mut log_length);

        let mut log = vec![0u8; log_length.max(1) as usize];
        gl::GetProgramInfoLog(
            program,
            log_length,
            std::ptr::null_mut(),
            log.as_mut_ptr() as *mut gl::types::GLchar,
        );

        return Err(anyhow!(
            "Program linking error: {}",
            String::from_utf8_lossy(&log)
        ));
    }

    Ok(())
}
