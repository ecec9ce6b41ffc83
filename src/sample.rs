//! Départements de démonstration, utilisés quand le stockage est vide ou réinitialisé.

use crate::model::{
    Assignment, AssignmentId, Batch, BatchId, Classroom, ClassroomId, Department, DepartmentId,
    Subject, SubjectId, Teacher, TeacherId, TimetableSettings,
};

fn teacher(id: &str, name: &str) -> Teacher {
    Teacher {
        id: TeacherId::new(id),
        name: name.to_string(),
    }
}

fn subject(id: &str, name: &str, code: &str) -> Subject {
    Subject {
        id: SubjectId::new(id),
        name: name.to_string(),
        code: code.to_string(),
    }
}

fn assignment(id: &str, teacher: &str, subject: &str, weekly_lectures: u32) -> Assignment {
    Assignment {
        id: AssignmentId::new(id),
        teacher_id: TeacherId::new(teacher),
        subject_id: SubjectId::new(subject),
        weekly_lectures,
    }
}

fn batch(id: &str, name: &str, subjects: &[&str]) -> Batch {
    Batch {
        id: BatchId::new(id),
        name: name.to_string(),
        subject_ids: subjects.iter().map(SubjectId::new).collect(),
    }
}

fn classroom(id: &str, name: &str, capacity: u32, equipment: &[&str]) -> Classroom {
    Classroom {
        id: ClassroomId::new(id),
        name: name.to_string(),
        capacity,
        equipment: equipment.iter().map(|e| e.to_string()).collect(),
    }
}

fn settings(periods: &[&str], max_lectures_per_day: u32) -> TimetableSettings {
    TimetableSettings {
        period_timings: periods.iter().map(|p| p.to_string()).collect(),
        max_lectures_per_day,
        ..TimetableSettings::default()
    }
}

fn empty(id: &str, name: &str, settings: TimetableSettings) -> Department {
    Department {
        id: DepartmentId::new(id),
        name: name.to_string(),
        teachers: Vec::new(),
        subjects: Vec::new(),
        assignments: Vec::new(),
        batches: Vec::new(),
        classrooms: Vec::new(),
        settings,
        finalized_timetable: None,
    }
}

pub fn sample_departments() -> Vec<Department> {
    let mut cse = empty(
        "dept-cse",
        "Computer Science & Engineering",
        settings(
            &[
                "09:00 - 10:00",
                "10:00 - 11:00",
                "11:00 - 12:00",
                "13:00 - 14:00",
                "14:00 - 15:00",
            ],
            3,
        ),
    );
    cse.teachers = vec![
        teacher("t1", "Dr. Tanwi"),
        teacher("t2", "Prof. Sandeep"),
        teacher("t3", "Prof. Sachin"),
    ];
    cse.subjects = vec![
        subject("s1", "Intro to Programming", "CS101"),
        subject("s2", "Data Structures", "CS201"),
        subject("s3", "Algorithms", "CS305"),
    ];
    cse.assignments = vec![
        assignment("a1", "t1", "s1", 4),
        assignment("a2", "t2", "s2", 4),
        assignment("a3", "t1", "s3", 3),
        assignment("a6", "t3", "s2", 4),
    ];
    cse.batches = vec![
        batch("b1", "Batch A (Year 1)", &["s1", "s2"]),
        batch("b2", "Batch B (Year 2)", &["s2", "s3"]),
    ];
    cse.classrooms = vec![
        classroom("c1", "CS-101", 60, &["Projector", "Whiteboard"]),
        classroom("c2", "CS-102", 70, &["Projector", "Smartboard"]),
        classroom("c3", "CS Lab A", 40, &["Computers", "Projector"]),
    ];

    let mut it = empty(
        "dept-it",
        "Information Technology",
        settings(
            &[
                "09:00 - 10:00",
                "10:00 - 11:00",
                "11:00 - 12:00",
                "13:00 - 14:00",
                "14:00 - 15:00",
                "15:00 - 16:00",
            ],
            4,
        ),
    );
    // t2 porte le même id qu'en CSE mais un autre nom
    it.teachers = vec![teacher("t4", "Dr. J. Iyer"), teacher("t2", "Dr. I. Mehta")];
    it.subjects = vec![
        subject("s4", "Networking", "IT202"),
        subject("s5", "Cyber Security", "IT405"),
    ];
    it.assignments = vec![
        assignment("a4", "t4", "s4", 5),
        assignment("a5", "t2", "s5", 5),
    ];
    it.batches = vec![batch("b3", "Batch C (Year 3)", &["s4", "s5"])];
    it.classrooms = vec![
        classroom("c4", "IT-201", 50, &["Projector", "Whiteboard"]),
        classroom("c5", "IT-202", 60, &["Projector", "Smartboard"]),
    ];

    let me = empty(
        "dept-me",
        "Mechanical Engineering",
        settings(
            &[
                "08:00 - 09:00",
                "09:00 - 10:00",
                "10:00 - 11:00",
                "11:00 - 12:00",
                "13:00 - 14:00",
                "14:00 - 15:00",
                "15:00 - 16:00",
            ],
            4,
        ),
    );

    let ds = empty(
        "dept-ds",
        "CSE (Data Science)",
        settings(
            &[
                "09:30 - 10:30",
                "10:30 - 11:30",
                "11:30 - 12:30",
                "13:30 - 14:30",
                "14:30 - 15:30",
            ],
            3,
        ),
    );

    vec![cse, it, me, ds]
}
