// webgl.rs - WebGL2 point renderer
//
// One program shared by all layers. Each layer owns a VAO with a dynamic
// position buffer and a static color buffer. Points use size attenuation
// (size * half drawing-buffer height / eye depth) and optional fog.

use super::describe;
use crate::error::{BackdropError, BackdropResult};
use crate::render::{Camera, Fog, LayerDraw, LayerHandle, LayerStyle, PointBackend};
use crate::viewport::ViewportState;
use js_sys::Float32Array;
use std::collections::HashMap;
use wasm_bindgen::JsCast;
use web_sys::{
    HtmlCanvasElement, HtmlElement, Node, WebGl2RenderingContext as GL, WebGlBuffer, WebGlProgram,
    WebGlShader, WebGlUniformLocation, WebGlVertexArrayObject,
};

const MAX_PIXEL_RATIO: f64 = 2.0;

const VERT_SRC: &str = r#"#version 300 es
layout(location = 0) in vec3 a_position;
layout(location = 1) in vec3 a_color;
uniform mat4 u_model_view;
uniform mat4 u_projection;
uniform float u_size;
uniform float u_scale;
out vec3 v_color;
out float v_depth;
void main() {
    vec4 eye = u_model_view * vec4(a_position, 1.0);
    v_color = a_color;
    v_depth = -eye.z;
    gl_PointSize = u_size * u_scale / -eye.z;
    gl_Position = u_projection * eye;
}
"#;

const FRAG_SRC: &str = r#"#version 300 es
precision mediump float;
in vec3 v_color;
in float v_depth;
uniform float u_opacity;
uniform float u_fog_enabled;
uniform vec3 u_fog_color;
uniform vec2 u_fog_range;
out vec4 frag;
void main() {
    vec3 color = v_color;
    if (u_fog_enabled > 0.5) {
        color = mix(color, u_fog_color, smoothstep(u_fog_range.x, u_fog_range.y, v_depth));
    }
    frag = vec4(color, u_opacity);
}
"#;

struct GlLayer {
    vao: WebGlVertexArrayObject,
    positions: WebGlBuffer,
    colors: WebGlBuffer,
    count: i32,
    style: LayerStyle,
}

struct Uniforms {
    model_view: Option<WebGlUniformLocation>,
    projection: Option<WebGlUniformLocation>,
    size: Option<WebGlUniformLocation>,
    scale: Option<WebGlUniformLocation>,
    opacity: Option<WebGlUniformLocation>,
    fog_enabled: Option<WebGlUniformLocation>,
    fog_color: Option<WebGlUniformLocation>,
    fog_range: Option<WebGlUniformLocation>,
}

impl Uniforms {
    fn locate(gl: &GL, program: &WebGlProgram) -> Self {
        let at = |name| gl.get_uniform_location(program, name);
        Self {
            model_view: at("u_model_view"),
            projection: at("u_projection"),
            size: at("u_size"),
            scale: at("u_scale"),
            opacity: at("u_opacity"),
            fog_enabled: at("u_fog_enabled"),
            fog_color: at("u_fog_color"),
            fog_range: at("u_fog_range"),
        }
    }
}

fn compile_shader(gl: &GL, src: &str, kind: u32) -> BackdropResult<WebGlShader> {
    let shader = gl
        .create_shader(kind)
        .ok_or_else(|| BackdropError::ResourceAcquisition("could not create shader".into()))?;
    gl.shader_source(&shader, src);
    gl.compile_shader(&shader);
    if !gl.get_shader_parameter(&shader, GL::COMPILE_STATUS).as_bool().unwrap_or(false) {
        let log = gl.get_shader_info_log(&shader).unwrap_or_default();
        gl.delete_shader(Some(&shader));
        return Err(BackdropError::ResourceAcquisition(log));
    }
    Ok(shader)
}

fn link_program(gl: &GL) -> BackdropResult<WebGlProgram> {
    let vert = compile_shader(gl, VERT_SRC, GL::VERTEX_SHADER)?;
    let frag = match compile_shader(gl, FRAG_SRC, GL::FRAGMENT_SHADER) {
        Ok(f) => f,
        Err(e) => {
            gl.delete_shader(Some(&vert));
            return Err(e);
        }
    };
    let program = gl.create_program();
    if let Some(program) = &program {
        gl.attach_shader(program, &vert);
        gl.attach_shader(program, &frag);
        gl.link_program(program);
    }
    gl.delete_shader(Some(&vert));
    gl.delete_shader(Some(&frag));

    let program = program
        .ok_or_else(|| BackdropError::ResourceAcquisition("could not create program".into()))?;
    if !gl.get_program_parameter(&program, GL::LINK_STATUS).as_bool().unwrap_or(false) {
        let log = gl.get_program_info_log(&program).unwrap_or_default();
        gl.delete_program(Some(&program));
        return Err(BackdropError::ResourceAcquisition(log));
    }
    Ok(program)
}

pub struct GlPoints {
    canvas: HtmlCanvasElement,
    container: HtmlElement,
    gl: GL,
    program: Option<WebGlProgram>,
    uniforms: Uniforms,
    layers: HashMap<LayerHandle, GlLayer>,
    next: u32,
    pixel_ratio: f64,
    detached: bool,
}

impl GlPoints {
    pub fn new(canvas: HtmlCanvasElement, container: HtmlElement) -> BackdropResult<Self> {
        let gl: GL = canvas
            .get_context("webgl2")
            .map_err(|e| BackdropError::ResourceAcquisition(describe(&e)))?
            .ok_or_else(|| BackdropError::ResourceAcquisition("WebGL2 not supported".into()))?
            .dyn_into()
            .map_err(|_| {
                BackdropError::ResourceAcquisition("unexpected webgl2 context type".into())
            })?;

        let program = link_program(&gl)?;
        let uniforms = Uniforms::locate(&gl, &program);
        let pixel_ratio = web_sys::window()
            .map(|w| w.device_pixel_ratio())
            .unwrap_or(1.0)
            .clamp(1.0, MAX_PIXEL_RATIO);

        Ok(Self {
            canvas,
            container,
            gl,
            program: Some(program),
            uniforms,
            layers: HashMap::new(),
            next: 0,
            pixel_ratio,
            detached: false,
        })
    }

    fn delete_layer(&self, layer: GlLayer) {
        self.gl.delete_vertex_array(Some(&layer.vao));
        self.gl.delete_buffer(Some(&layer.positions));
        self.gl.delete_buffer(Some(&layer.colors));
    }

    fn bind_attribute(&self, location: u32, buffer: &WebGlBuffer, data: &[f32], usage: u32) {
        self.gl.bind_buffer(GL::ARRAY_BUFFER, Some(buffer));
        self.gl
            .buffer_data_with_array_buffer_view(GL::ARRAY_BUFFER, &Float32Array::from(data), usage);
        self.gl.enable_vertex_attrib_array(location);
        self.gl.vertex_attrib_pointer_with_i32(location, 3, GL::FLOAT, false, 0, 0);
    }
}

impl PointBackend for GlPoints {
    fn set_viewport(&mut self, viewport: &ViewportState) {
        let w = (viewport.width as f64 * self.pixel_ratio).round() as u32;
        let h = (viewport.height as f64 * self.pixel_ratio).round() as u32;
        self.canvas.set_width(w);
        self.canvas.set_height(h);
        self.gl.viewport(0, 0, w as i32, h as i32);
    }

    fn create_layer(
        &mut self,
        positions: &[f32],
        colors: &[f32],
        style: &LayerStyle,
    ) -> BackdropResult<LayerHandle> {
        let gl = &self.gl;
        let allocated = (gl.create_vertex_array(), gl.create_buffer(), gl.create_buffer());
        let (vao, pos_buf, col_buf) = match allocated {
            (Some(v), Some(p), Some(c)) => (v, p, c),
            (v, p, c) => {
                gl.delete_vertex_array(v.as_ref());
                gl.delete_buffer(p.as_ref());
                gl.delete_buffer(c.as_ref());
                let reason = "could not allocate layer buffers".into();
                return Err(BackdropError::ResourceAcquisition(reason));
            }
        };

        gl.bind_vertex_array(Some(&vao));
        self.bind_attribute(0, &pos_buf, positions, GL::DYNAMIC_DRAW);
        self.bind_attribute(1, &col_buf, colors, GL::STATIC_DRAW);
        self.gl.bind_vertex_array(None);
        self.gl.bind_buffer(GL::ARRAY_BUFFER, None);

        let handle = LayerHandle(self.next);
        self.next += 1;
        self.layers.insert(
            handle,
            GlLayer {
                vao,
                positions: pos_buf,
                colors: col_buf,
                count: (positions.len() / 3) as i32,
                style: *style,
            },
        );
        Ok(handle)
    }

    fn upload_positions(&mut self, layer: LayerHandle, positions: &[f32]) {
        let Some(layer) = self.layers.get(&layer) else { return };
        self.gl.bind_buffer(GL::ARRAY_BUFFER, Some(&layer.positions));
        self.gl.buffer_sub_data_with_i32_and_array_buffer_view(
            GL::ARRAY_BUFFER,
            0,
            &Float32Array::from(positions),
        );
        self.gl.bind_buffer(GL::ARRAY_BUFFER, None);
    }

    fn render(&mut self, camera: &Camera, fog: Option<&Fog>, layers: &[LayerDraw]) {
        let gl = &self.gl;
        gl.clear_color(0.0, 0.0, 0.0, 0.0);
        gl.clear(GL::COLOR_BUFFER_BIT);
        let Some(program) = &self.program else { return };

        gl.use_program(Some(program));
        gl.enable(GL::BLEND);
        gl.blend_func(GL::SRC_ALPHA, GL::ONE_MINUS_SRC_ALPHA);

        let u = &self.uniforms;
        let projection = camera.projection().to_cols_array();
        gl.uniform_matrix4fv_with_f32_array(u.projection.as_ref(), false, &projection);
        gl.uniform1f(u.scale.as_ref(), self.canvas.height() as f32 * 0.5);
        match fog {
            Some(fog) => {
                let [r, g, b] = fog.color.to_unit();
                gl.uniform1f(u.fog_enabled.as_ref(), 1.0);
                gl.uniform3f(u.fog_color.as_ref(), r, g, b);
                gl.uniform2f(u.fog_range.as_ref(), fog.near, fog.far);
            }
            None => gl.uniform1f(u.fog_enabled.as_ref(), 0.0),
        }

        let view = camera.view();
        for draw in layers {
            let Some(layer) = self.layers.get(&draw.layer) else { continue };
            let model_view = view * draw.model;
            let model_view = model_view.to_cols_array();
            gl.uniform_matrix4fv_with_f32_array(u.model_view.as_ref(), false, &model_view);
            gl.uniform1f(u.size.as_ref(), layer.style.size);
            gl.uniform1f(u.opacity.as_ref(), layer.style.opacity);
            gl.bind_vertex_array(Some(&layer.vao));
            gl.draw_arrays(GL::POINTS, 0, layer.count);
        }
        gl.bind_vertex_array(None);
    }

    fn release_layer(&mut self, layer: LayerHandle) {
        if let Some(layer) = self.layers.remove(&layer) {
            self.delete_layer(layer);
        }
    }

    fn detach(&mut self) {
        if self.detached {
            return;
        }
        self.detached = true;

        let layers: Vec<GlLayer> = self.layers.drain().map(|(_, l)| l).collect();
        for layer in layers {
            self.delete_layer(layer);
        }
        if let Some(program) = self.program.take() {
            self.gl.delete_program(Some(&program));
        }

        let host: &Node = &self.container;
        if self.canvas.parent_node().is_some_and(|p| p.is_same_node(Some(host))) {
            if let Err(e) = host.remove_child(&self.canvas) {
                log::warn!("failed to remove canvas: {}", describe(&e));
            }
        }
    }
}
